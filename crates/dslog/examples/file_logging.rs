//! JSON file logging with size-based rotation

use dslog::prelude::*;

fn main() -> LogResult<()> {
    let config = Config {
        log_file: "logs/app.log".into(),
        log_file_format: Some(LogFormat::Json),
        max_size: 1,
        max_backups: 3,
        ..Config::default()
    };
    let logger = Logger::new("info", Some(config), [LoggerOption::ServiceName("api".into())])?;

    for i in 0..10 {
        info!(logger, "processing batch", "iteration" => i);
    }

    logger.rotate()?;
    if let Some(rotation) = logger.rotation() {
        for backup in rotation.backups()? {
            println!("backup: {}", backup.path.display());
        }
    }
    Ok(())
}
