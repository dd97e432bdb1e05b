//! Per-sink rendering rules

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::level::{LevelFormats, Severity};

/// How timestamps are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEncoding {
    /// `2024-05-01T12:00:00.000Z`
    #[default]
    Iso8601,
    /// `2024-05-01T12:00:00.123456789Z`
    Rfc3339,
    /// Milliseconds since the Unix epoch
    EpochMillis,
}

impl TimeEncoding {
    /// Render `at` in this encoding
    pub fn format(self, at: OffsetDateTime) -> String {
        let formatted = match self {
            Self::Iso8601 => at.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            )),
            Self::Rfc3339 => at.format(&Rfc3339),
            Self::EpochMillis => return (at.unix_timestamp_nanos() / 1_000_000).to_string(),
        };
        formatted.unwrap_or_else(|_| at.unix_timestamp().to_string())
    }
}

/// Level renderer bound to a level-format table and a coloring policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEncoder {
    formats: Arc<LevelFormats>,
    colored: bool,
}

impl LevelEncoder {
    /// Bind a renderer to `formats`
    pub fn new(formats: Arc<LevelFormats>, colored: bool) -> Self {
        Self { formats, colored }
    }

    /// Render the label for `severity`
    pub fn render(&self, severity: Severity) -> String {
        self.formats.render(severity, self.colored)
    }
}

/// Rendering rules for one sink
///
/// Empty key names drop the corresponding element from the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Key for the timestamp
    pub time_key: String,
    /// Key for the level label
    pub level_key: String,
    /// Key for the message
    pub message_key: String,
    /// Key for the call site
    pub caller_key: String,
    /// Separator between console elements; kept equal to
    /// [`Config::console_separator`](crate::Config::console_separator)
    pub separator: String,
    /// Timestamp encoding
    pub time_encoding: TimeEncoding,
    /// Installed by [`merge`](crate::config::merge), never serialized
    #[serde(skip)]
    pub level_encoder: Option<LevelEncoder>,
}

impl EncoderConfig {
    /// Stock key names shared by the console, text and JSON encoders
    pub fn standard() -> Self {
        Self {
            time_key: "timestamp".to_string(),
            level_key: "level".to_string(),
            message_key: "message".to_string(),
            caller_key: "caller".to_string(),
            ..Self::default()
        }
    }

    /// Render a level label, falling back to the canonical name when no
    /// level encoder has been installed yet
    pub fn render_level(&self, severity: Severity) -> String {
        match &self.level_encoder {
            Some(encoder) => encoder.render(severity),
            None => severity.as_str().to_string(),
        }
    }

    /// `true` if nothing but the level encoder differs from the zero value
    pub(crate) fn is_unset(&self) -> bool {
        Self {
            level_encoder: None,
            ..self.clone()
        } == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn time_encodings() {
        let at = datetime!(2024-05-01 12:30:45.123456 UTC);
        assert_eq!(TimeEncoding::Iso8601.format(at), "2024-05-01T12:30:45.123Z");
        assert!(TimeEncoding::Rfc3339.format(at).starts_with("2024-05-01T12:30:45.123"));
        assert_eq!(TimeEncoding::EpochMillis.format(at), "1714566645123");
    }

    #[test]
    fn render_level_without_encoder_uses_canonical_name() {
        assert_eq!(EncoderConfig::standard().render_level(Severity::Warn), "warn");
    }

    #[test]
    fn render_level_with_encoder() {
        let mut cfg = EncoderConfig::standard();
        cfg.level_encoder = Some(LevelEncoder::new(Arc::new(LevelFormats::standard()), false));
        assert_eq!(cfg.render_level(Severity::Info), "INFO ");
    }

    #[test]
    fn unset_ignores_level_encoder() {
        let cfg = EncoderConfig {
            level_encoder: Some(LevelEncoder::new(Arc::default(), true)),
            ..EncoderConfig::default()
        };
        assert!(cfg.is_unset());
        assert!(!EncoderConfig::standard().is_unset());
    }
}
