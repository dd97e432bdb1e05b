//! Core configuration types

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{EncoderConfig, LevelEncoder};
use crate::level::LevelFormats;

/// Output format of the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One plain text line per record, fields flattened into the message
    #[default]
    Text,
    /// One JSON object per line, fields kept structured
    Json,
}

impl FromStr for LogFormat {
    type Err = crate::LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(crate::LogError::config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Logger configuration
///
/// Every field left at its zero value (empty string, `0`, `None`) is treated
/// as unset and filled in by [`merge`](super::merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the log file
    pub log_file: PathBuf,
    /// File output format
    pub log_file_format: Option<LogFormat>,
    /// Rotate once the file would exceed this many megabytes
    pub max_size: u64,
    /// Retired segments to keep
    pub max_backups: usize,
    /// Days to keep retired segments
    pub max_age: u64,
    /// Gzip retired segments
    pub compress: Option<bool>,
    /// Level used when the builder is not given one
    pub level: String,
    /// Console rendering rules
    pub console: EncoderConfig,
    /// File rendering rules
    pub file: EncoderConfig,
    /// Separator between console elements and between rendered fields
    pub console_separator: String,
    /// Separator between a field key and its value
    pub field_separator: String,
    /// Prefix and suffix wrapped around the service name
    pub service_name_decorators: [String; 2],
    /// Level display table
    pub level_formats: Option<LevelFormats>,
}

impl Config {
    /// The complete default configuration
    #[must_use]
    pub fn defaults() -> Self {
        let mut config = Self::raw_defaults();
        config.sync();
        config
    }

    pub(super) fn raw_defaults() -> Self {
        Self {
            log_file: PathBuf::from("./app.log"),
            log_file_format: Some(LogFormat::Text),
            max_size: 10,
            max_backups: 5,
            max_age: 28,
            compress: Some(true),
            level: "info".to_string(),
            console: EncoderConfig::standard(),
            file: EncoderConfig::standard(),
            console_separator: " | ".to_string(),
            field_separator: ": ".to_string(),
            service_name_decorators: ["[".to_string(), "]".to_string()],
            level_formats: Some(LevelFormats::standard()),
        }
    }

    /// File output format, `text` when unset
    #[must_use]
    pub fn file_format(&self) -> LogFormat {
        self.log_file_format.unwrap_or_default()
    }

    /// `true` when the file sink writes JSON
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.file_format() == LogFormat::Json
    }

    /// Resynchronize encoder separators with [`Config::console_separator`]
    /// and bind both level encoders to this config's own level table
    /// (console colored, file plain).
    pub fn sync(&mut self) {
        self.console.separator.clone_from(&self.console_separator);
        self.file.separator.clone_from(&self.console_separator);

        let formats = Arc::new(self.level_formats.clone().unwrap_or_default());
        self.console.level_encoder = Some(LevelEncoder::new(Arc::clone(&formats), true));
        self.file.level_encoder = Some(LevelEncoder::new(formats, false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;

    #[test]
    fn defaults_are_synced() {
        let config = Config::defaults();
        assert_eq!(config.console.separator, " | ");
        assert_eq!(config.file.separator, " | ");
        assert_eq!(
            config.console.render_level(Severity::Info),
            "\x1b[32mINFO \x1b[0m"
        );
        assert_eq!(config.file.render_level(Severity::Info), "INFO ");
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn partial_config_deserializes() {
        let config: Config = serde_json::from_str(
            r#"{
                "log_file": "/var/log/api.log",
                "log_file_format": "json",
                "max_size": 50,
                "service_name_decorators": ["<", ">"],
                "level_formats": { "info": { "label": "INF" } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.log_file, PathBuf::from("/var/log/api.log"));
        assert!(config.is_json());
        assert_eq!(config.max_size, 50);
        assert_eq!(config.max_backups, 0);
        assert_eq!(config.service_name_decorators, ["<", ">"]);
        let formats = config.level_formats.unwrap();
        assert_eq!(formats.render(Severity::Info, true), "INF\x1b[0m");
    }
}
