//! Console logging with fields, forks and a level change

use dslog::prelude::*;

fn main() -> LogResult<()> {
    let logger = Logger::simple_console("debug")?;

    debug!(logger, "booting", "pid" => std::process::id());
    info!(logger, "listening", "port" => 8080, "tls" => false);

    let worker = logger.with_service("worker").with_fields(fields!("shard" => 3));
    worker.info("picked up job", &fields!("job_id" => "j-19"));

    logger.set_level(Severity::Warn);
    info!(logger, "suppressed");
    warn!(logger, "queue is backing up", "depth" => 512);
    Ok(())
}
