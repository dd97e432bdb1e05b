//! Routing `tracing` events through a dual-sink logger

use dslog::{DualSinkLayer, Logger, LoggerOption, writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> dslog::LogResult<()> {
    // Keep stdout free for program output.
    let logger = Logger::console("debug", None, [LoggerOption::ConsoleWriter(writer::stderr())])?
        .with_service("bridge");

    tracing_subscriber::registry()
        .with(DualSinkLayer::new(logger))
        .init();

    tracing::info!(port = 8080, "server starting");
    tracing::warn!(elapsed_ms = 1200_u64, "slow request");
    Ok(())
}
