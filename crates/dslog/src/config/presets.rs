//! Configuration presets for common scenarios

use std::path::PathBuf;

use super::{Config, LogFormat};

impl Config {
    /// Create a partial configuration from `DSLOG_FILE`, `DSLOG_FORMAT`
    /// and `DSLOG_LEVEL`. Unset variables stay unset so that
    /// [`merge`](super::merge) supplies the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("DSLOG_FILE") {
            config.log_file = PathBuf::from(path);
        }
        if let Some(format) = lookup("DSLOG_FORMAT") {
            config.log_file_format = format.parse().ok();
        }
        if let Some(level) = lookup("DSLOG_LEVEL") {
            config.level = level;
        }

        config
    }

    /// Development configuration (debug level, text file)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            log_file_format: Some(LogFormat::Text),
            ..Self::default()
        }
    }

    /// Production configuration (info level, JSON file)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            log_file_format: Some(LogFormat::Json),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_lookup_overlays_known_keys() {
        let config = Config::from_lookup(|key| match key {
            "DSLOG_FILE" => Some("/tmp/x.log".to_string()),
            "DSLOG_FORMAT" => Some("json".to_string()),
            _ => None,
        });

        assert_eq!(config.log_file, PathBuf::from("/tmp/x.log"));
        assert_eq!(config.log_file_format, Some(LogFormat::Json));
        assert!(config.level.is_empty());
    }

    #[test]
    fn bad_format_stays_unset() {
        let config = Config::from_lookup(|key| (key == "DSLOG_FORMAT").then(|| "xml".to_string()));
        assert_eq!(config.log_file_format, None);
    }

    #[test]
    fn presets_pick_file_format() {
        assert!(Config::production().is_json());
        assert!(!Config::development().is_json());
    }
}
