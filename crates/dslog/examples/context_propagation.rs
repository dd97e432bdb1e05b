//! Correlation identifiers carried through a thread-local context

use dslog::prelude::*;

fn handle(logger: &Logger) {
    let logger = logger.with_current_context();
    logger.info("handling request", &[]);
}

fn main() -> LogResult<()> {
    let logger = Logger::simple_console("info")?;

    Context::new()
        .with_request_id("req-123")
        .with_trace_id("trace-abc")
        .scope(|| handle(&logger));

    // No identifiers: the logger is used as is.
    handle(&logger);
    Ok(())
}
