//! HTTP probe implementation.

use std::time::{Duration, Instant};

use super::{ProbeError, ProbeResult};

/// Run an HTTP GET probe against the given target.
///
/// The timeout is attached to the request itself and covers connecting,
/// sending and reading the whole body. It is unrelated to any run-level
/// cancellation, so an in-flight probe always finishes or times out.
pub async fn run_http_probe(client: &reqwest::Client, target: &str, timeout: Duration) -> ProbeResult {
    let start = Instant::now();

    let request = match client.get(target).timeout(timeout).build() {
        Ok(request) => request,
        Err(e) => {
            return ProbeResult::failed(
                target,
                start.elapsed(),
                ProbeError::InvalidRequest(e.to_string()),
            );
        }
    };

    let mut response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => return ProbeResult::failed(target, start.elapsed(), classify_error(&e, timeout)),
    };

    let status = response.status().as_u16();

    // Read the full body to measure complete transfer time
    let payload_size = match body_len(&mut response).await {
        Ok(len) => len,
        Err(e) => {
            tracing::warn!(url = %target, status, "failed to read response body: {}", e);
            0
        }
    };

    ProbeResult::completed(target, start.elapsed(), status, payload_size)
}

/// Drain the body chunk by chunk, counting bytes without buffering them.
async fn body_len(response: &mut reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut len = 0u64;
    while let Some(chunk) = response.chunk().await? {
        len += chunk.len() as u64;
    }
    Ok(len)
}

fn classify_error(e: &reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout)
    } else if e.is_builder() {
        ProbeError::InvalidRequest(e.to_string())
    } else if e.is_connect() {
        ProbeError::Connect(e.to_string())
    } else {
        ProbeError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_http_probe_success() {
        let server = MockServer::start().await;
        mount(&server, "/ok", ResponseTemplate::new(200).set_body_string("0123456789")).await;

        let target = format!("{}/ok", server.uri());
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(2)).await;

        assert_eq!(result.target, target);
        assert!(result.success);
        assert_eq!(result.status, 200);
        assert_eq!(result.payload_size, 10);
        assert!(result.error.is_none());
        assert!(result.duration > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_http_probe_not_found_keeps_status() {
        let server = MockServer::start().await;
        mount(&server, "/missing", ResponseTemplate::new(404).set_body_string("not found")).await;

        let target = format!("{}/missing", server.uri());
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(2)).await;

        assert!(!result.success);
        assert_eq!(result.status, 404);
        assert_eq!(result.payload_size, 9);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_http_probe_redirect_status_counts_as_success() {
        let server = MockServer::start().await;
        // No Location header, so the client reports the 304 as is
        mount(&server, "/cached", ResponseTemplate::new(304)).await;

        let target = format!("{}/cached", server.uri());
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(2)).await;

        assert!(result.success);
        assert_eq!(result.status, 304);
    }

    #[tokio::test]
    async fn test_http_probe_timeout() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/slow",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
        )
        .await;

        let target = format!("{}/slow", server.uri());
        let timeout = Duration::from_millis(100);
        let result = run_http_probe(&reqwest::Client::new(), &target, timeout).await;

        assert!(!result.success);
        assert_eq!(result.status, 0);
        assert_eq!(result.payload_size, 0);
        assert_eq!(result.error, Some(ProbeError::Timeout(timeout)));
        assert!(result.duration >= timeout);
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = format!("http://{}/", addr);
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(2)).await;

        assert!(!result.success);
        assert_eq!(result.status, 0);
        assert!(matches!(result.error, Some(ProbeError::Connect(_))));
    }

    #[tokio::test]
    async fn test_http_probe_large_body_is_counted() {
        let server = MockServer::start().await;
        let body = vec![b'x'; 256 * 1024];
        mount(&server, "/large", ResponseTemplate::new(200).set_body_bytes(body)).await;

        let target = format!("{}/large", server.uri());
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(5)).await;

        assert!(result.success);
        assert_eq!(result.payload_size, 256 * 1024);
    }

    #[tokio::test]
    async fn test_http_probe_truncated_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promise 100 bytes, send 3, then hang up
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nabc")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let target = format!("http://{}/", addr);
        let result = run_http_probe(&reqwest::Client::new(), &target, Duration::from_secs(2)).await;

        assert_eq!(result.status, 200);
        assert!(result.success);
        assert_eq!(result.payload_size, 0);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_http_probe_invalid_url() {
        let result = run_http_probe(&reqwest::Client::new(), "not a url", Duration::from_millis(100)).await;
        assert!(!result.success);
        assert_eq!(result.status, 0);
        assert!(matches!(result.error, Some(ProbeError::InvalidRequest(_))));
    }
}
