//! Status Monitor - HTTP endpoint monitoring
//!
//! Probes a list of URLs on a fixed interval and keeps a live table of
//! success rate, latency, payload size and status codes per URL.

mod cli;
mod config;
mod display;
mod probe;
mod scheduler;
mod stats;
mod validate;

use clap::Parser;
use cli::Cli;
use config::MonitorConfig;
use display::{Display, JsonRenderer, Renderer, TableRenderer};
use scheduler::Monitor;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    // Initialize logging on stderr, stdout belongs to the table
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("status_monitor=info".parse()?))
        .init();

    let targets = validate::dedup_targets(cli.urls);
    let invalid = validate::validate_targets(&targets);
    if !invalid.is_empty() {
        eprintln!("\nValidation failed: some URLs are invalid");
        for target in &invalid {
            eprintln!("  #{} {}: {}", target.index, target.url, target.error);
        }
        eprintln!("\n{}", cli::usage());
        std::process::exit(1);
    }

    let cfg = MonitorConfig::load().with_overrides(cli.interval, cli.timeout);
    let monitor = Arc::new(Monitor::new(targets, cfg)?);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            cancel.cancel();
        }
    });

    if cli.json {
        run(monitor, JsonRenderer::new(std::io::stdout()), cancel).await
    } else {
        run(monitor, TableRenderer::stdout(), cancel).await
    }
}

/// Run the monitor and the display side by side, then render the final state.
async fn run<R>(monitor: Arc<Monitor>, renderer: R, cancel: CancellationToken) -> Result<(), BoxError>
where
    R: Renderer + 'static,
{
    let mut display = Display::new(renderer, monitor.subscribe());
    let display_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let result = display.start(cancel.clone()).await;
            if let Err(e) = &result {
                // Nothing is left to show the results, end the session
                tracing::error!("Display failed: {}", e);
                cancel.cancel();
            }
            (display, result)
        }
    });

    let monitor_result = monitor.start(cancel.clone()).await;

    // Stop the display whatever the reason the monitor returned
    cancel.cancel();
    let (mut display, display_result) = display_task.await?;

    monitor_result?;
    display_result?;

    display.render(&monitor.current_snapshot())?;
    tracing::info!("Monitor stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use display::DisplayError;
    use stats::AggregateSnapshot;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fails every render, like stdout piped into a closed reader.
    struct ClosedPipe {
        attempts: Arc<AtomicUsize>,
    }

    impl Renderer for ClosedPipe {
        fn render(&mut self, _snapshot: &AggregateSnapshot) -> Result<(), DisplayError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into())
        }
    }

    #[derive(Default)]
    struct Sink {
        renders: Arc<AtomicUsize>,
    }

    impl Renderer for Sink {
        fn render(&mut self, _snapshot: &AggregateSnapshot) -> Result<(), DisplayError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn monitor_for(server: &MockServer) -> Arc<Monitor> {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        let cfg = MonitorConfig {
            interval: Duration::from_millis(20),
            timeout: Duration::from_secs(1),
        };
        Arc::new(Monitor::new(vec![server.uri()], cfg).unwrap())
    }

    #[tokio::test]
    async fn test_display_failure_ends_session() {
        let server = MockServer::start().await;
        let monitor = monitor_for(&server).await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            run(monitor, ClosedPipe { attempts: attempts.clone() }, cancel.clone()),
        )
        .await;

        let result = finished.expect("session kept running after the display failed");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to write output"));
        assert!(cancel.is_cancelled());
        // The final render is skipped once the display has failed
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_session_renders_final_snapshot() {
        let server = MockServer::start().await;
        let monitor = monitor_for(&server).await;
        let sink = Sink::default();
        let renders = sink.renders.clone();
        let cancel = CancellationToken::new();

        let session = tokio::spawn(run(monitor.clone(), sink, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let finished = tokio::time::timeout(Duration::from_secs(5), session).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
        assert!(monitor.current_snapshot().generation >= 1);
        // Initial empty table plus the final snapshot at least
        assert!(renders.load(Ordering::SeqCst) >= 2);
    }
}
