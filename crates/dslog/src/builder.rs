//! Logger construction
//!
//! Everything a [`Logger`] needs is assembled here before the logger is
//! sealed: the configuration is merged against the defaults, options are
//! applied in order, level encoders are bound to the final level table, the
//! rotation controller is opened and the sink pair is built. Later changes go
//! through [`Logger::set_level`] or derive a new logger.

use std::sync::Arc;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{Config, merge};
use crate::core::LogResult;
use crate::encoder::{ConsoleEncoder, Encode, JsonEncoder};
use crate::field::{Field, Value};
use crate::level::{LevelFormats, Severity};
use crate::logger::{Logger, Sinks};
use crate::rotation::{RotatingFile, RotationPolicy};
use crate::sink::{Sink, SinkOption};
use crate::writer;

/// Construction-time adjustment, applied in the order given
#[derive(Debug)]
pub enum LoggerOption {
    /// Report (or stop reporting) the call site on both sinks
    Caller(bool),
    /// Replace console rendering
    ConsoleEncoder(Arc<dyn Encode>),
    /// Replace file rendering; ignored without a file sink
    FileEncoder(Arc<dyn Encode>),
    /// Persistent fields attached to every record
    Fields(Vec<Field>),
    /// Level display entries, overwriting configured entries by severity
    LevelFormats(LevelFormats),
    /// Service decoration, plus a `service` field in JSON files
    ServiceName(String),
    /// Console byte-sink; standard output by default
    ConsoleWriter(BoxMakeWriter),
}

impl LoggerOption {
    /// A single persistent field
    pub fn field(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Fields(vec![Field::new(key, value)])
    }

    /// Persistent fields from a flat `key, value, ...` list
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Usage`](crate::LogError::Usage) for an odd-length
    /// list or a non-string key.
    pub fn fields_from_pairs(pairs: impl IntoIterator<Item = Value>) -> LogResult<Self> {
        Field::from_pairs(pairs).map(Self::Fields)
    }
}

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    level: Option<String>,
    config: Option<Config>,
    file: bool,
    options: Vec<LoggerOption>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Builder for a console + file logger with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: None,
            config: None,
            file: true,
            options: Vec::new(),
        }
    }

    /// Builder starting from a (possibly partial) configuration
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self::new().config(config)
    }

    /// Threshold name; unknown names mean `info`. Defaults to
    /// [`Config::level`].
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Configuration to merge against the defaults
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Skip the file sink
    #[must_use]
    pub fn console_only(mut self) -> Self {
        self.file = false;
        self
    }

    /// Append one option
    #[must_use]
    pub fn option(mut self, option: LoggerOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append several options
    #[must_use]
    pub fn options(mut self, options: impl IntoIterator<Item = LoggerOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) or
    /// [`LogError::Config`](crate::LogError::Config) if the log file cannot
    /// be opened.
    pub fn build(self) -> LogResult<Logger> {
        let mut config = merge(self.config.unwrap_or_default());
        let threshold = Severity::parse_lossy(self.level.as_deref().unwrap_or(&config.level));

        let mut caller = true;
        let mut console_encoder = None;
        let mut file_encoder = None;
        let mut console_writer = None;
        let mut fields = Vec::new();
        let mut service = String::new();

        for option in self.options {
            match option {
                LoggerOption::Caller(enabled) => caller = enabled,
                LoggerOption::ConsoleEncoder(encoder) => console_encoder = Some(encoder),
                LoggerOption::FileEncoder(encoder) => file_encoder = Some(encoder),
                LoggerOption::Fields(extra) => fields.extend(extra),
                LoggerOption::LevelFormats(formats) => config
                    .level_formats
                    .get_or_insert_with(LevelFormats::empty)
                    .overlay(formats),
                LoggerOption::ServiceName(name) => service = name,
                LoggerOption::ConsoleWriter(writer) => console_writer = Some(writer),
            }
        }
        config.sync();

        let sink_options = [SinkOption::Caller(caller)];
        let console = Sink::new(
            console_encoder.unwrap_or_else(|| Arc::new(ConsoleEncoder::new(config.console.clone()))),
            console_writer.unwrap_or_else(writer::stdout),
            threshold,
        )
        .with_options(&sink_options);

        let (file, rotation) = if self.file {
            let rotation = Arc::new(RotatingFile::open(
                &config.log_file,
                RotationPolicy::from_config(&config),
            )?);
            let encoder = file_encoder.unwrap_or_else(|| default_file_encoder(&config));
            let mut sink = Sink::new(encoder, writer::rotating(Arc::clone(&rotation)), threshold)
                .with_options(&sink_options);
            if config.is_json() && !service.is_empty() {
                sink = sink.with_context_replaced(Field::new("service", service.as_str()));
            }
            (Some(sink), Some(rotation))
        } else {
            (None, None)
        };

        Ok(Logger::from_parts(
            Arc::new(config),
            rotation,
            service,
            fields.into(),
            Sinks { console, file },
        ))
    }
}

fn default_file_encoder(config: &Config) -> Arc<dyn Encode> {
    if config.is_json() {
        Arc::new(JsonEncoder::new(config.file.clone()))
    } else {
        Arc::new(ConsoleEncoder::new(config.file.clone()))
    }
}

impl Logger {
    /// Console + file logger.
    ///
    /// `config` of `None` means the defaults; unknown `level` names mean
    /// `info`.
    ///
    /// # Errors
    ///
    /// Fails if the log file cannot be opened.
    pub fn new(
        level: &str,
        config: Option<Config>,
        options: impl IntoIterator<Item = LoggerOption>,
    ) -> LogResult<Self> {
        LoggerBuilder::new()
            .level(level)
            .config(config.unwrap_or_default())
            .options(options)
            .build()
    }

    /// Console-only logger
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches [`Logger::new`].
    pub fn console(
        level: &str,
        config: Option<Config>,
        options: impl IntoIterator<Item = LoggerOption>,
    ) -> LogResult<Self> {
        LoggerBuilder::new()
            .level(level)
            .config(config.unwrap_or_default())
            .console_only()
            .options(options)
            .build()
    }

    /// Console + file logger with the default configuration
    ///
    /// # Errors
    ///
    /// Fails if `./app.log` cannot be opened.
    pub fn simple(level: &str) -> LogResult<Self> {
        Self::new(level, None, [])
    }

    /// Console-only logger with the default configuration
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches [`Logger::simple`].
    pub fn simple_console(level: &str) -> LogResult<Self> {
        Self::console(level, None, [])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use crate::level::LevelFormat;
    use crate::writer::CaptureWriter;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, format: LogFormat) -> Config {
        Config {
            log_file: dir.path().join("logs").join("app.log"),
            log_file_format: Some(format),
            ..Config::default()
        }
    }

    #[rstest]
    #[case("debug", Severity::Debug)]
    #[case("WARN", Severity::Warn)]
    #[case("verbose", Severity::Info)]
    #[case("", Severity::Info)]
    fn level_names_are_lenient(#[case] name: &str, #[case] expected: Severity) {
        let logger = Logger::simple_console(name).unwrap();
        assert_eq!(logger.level(), expected);
    }

    #[test]
    fn level_defaults_to_config() {
        let logger = LoggerBuilder::from_config(Config {
            level: "error".to_string(),
            ..Config::default()
        })
        .console_only()
        .build()
        .unwrap();
        assert_eq!(logger.level(), Severity::Error);
    }

    #[test]
    fn opens_file_sink_and_creates_directories() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new("info", Some(file_config(&dir, LogFormat::Text)), [
            LoggerOption::ConsoleWriter(CaptureWriter::new().boxed()),
        ])
        .unwrap();

        assert!(logger.has_file_sink());
        assert!(dir.path().join("logs").join("app.log").exists());
        assert_eq!(
            logger.rotation().map(|r| r.path().to_path_buf()),
            Some(dir.path().join("logs").join("app.log"))
        );
    }

    #[test]
    fn unwritable_path_fails_construction() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let config = Config {
            log_file: blocker.join("app.log"),
            ..Config::default()
        };
        assert!(Logger::new("info", Some(config), []).is_err());
    }

    #[test]
    fn level_format_option_overwrites_by_key() {
        let capture = CaptureWriter::new();
        let logger = LoggerBuilder::new()
            .console_only()
            .options([
                LoggerOption::ConsoleWriter(capture.boxed()),
                LoggerOption::Caller(false),
                LoggerOption::LevelFormats(
                    [(Severity::Info, LevelFormat::new("NOTE ", "\x1b[35m"))]
                        .into_iter()
                        .collect(),
                ),
            ])
            .build()
            .unwrap();

        logger.info("hi", &[]);
        logger.warn("careful", &[]);

        let out = capture.contents();
        assert!(out.contains("\x1b[35mNOTE \x1b[0m | hi"));
        assert!(out.contains("\x1b[33mWARN \x1b[0m | careful"));
    }

    #[test]
    fn option_fields_become_persistent() {
        let logger = Logger::console("info", None, [
            LoggerOption::field("app", "demo"),
            LoggerOption::fields_from_pairs(vec!["pid".into(), 7.into()]).unwrap(),
        ])
        .unwrap();

        assert_eq!(logger.fields(), [
            Field::new("app", "demo"),
            Field::new("pid", 7)
        ]);
    }

    #[test]
    fn odd_pairs_are_rejected() {
        let err = LoggerOption::fields_from_pairs(vec!["dangling".into()]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn service_name_option_decorates_and_tags_json() {
        let dir = TempDir::new().unwrap();
        let console = CaptureWriter::new();
        let logger = Logger::new("info", Some(file_config(&dir, LogFormat::Json)), [
            LoggerOption::ConsoleWriter(console.boxed()),
            LoggerOption::ServiceName("api".to_string()),
        ])
        .unwrap();

        logger.info("up", &[]);
        logger.sync().unwrap();

        assert_eq!(logger.service_name(), "api");
        assert!(console.contents().contains("[api] up"));

        let text = std::fs::read_to_string(dir.path().join("logs").join("app.log")).unwrap();
        let line: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(line["service"], "api");
        assert_eq!(line["message"], "up");
    }

    #[test]
    fn custom_file_encoder_replaces_rendering() {
        let dir = TempDir::new().unwrap();
        let mut plain = Config::defaults().file;
        plain.time_key.clear();
        plain.caller_key.clear();

        let logger = Logger::new("info", Some(file_config(&dir, LogFormat::Json)), [
            LoggerOption::ConsoleWriter(CaptureWriter::new().boxed()),
            LoggerOption::FileEncoder(Arc::new(ConsoleEncoder::new(plain))),
        ])
        .unwrap();

        logger.warn("disk", &[]);
        let text = std::fs::read_to_string(dir.path().join("logs").join("app.log")).unwrap();
        assert_eq!(text, "WARN  | disk\n");
    }
}
