//! Severities and the table that decides how they are displayed

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// ANSI reset escape appended after a colored label
pub const RESET: &str = "\x1b[0m";

/// Log severity, ordered from least to most important
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// Diagnostic detail
    Debug = 0,
    /// Normal operation
    #[default]
    Info = 1,
    /// Something unexpected that was handled
    Warn = 2,
    /// A failure
    Error = 3,
}

impl Severity {
    /// Every severity, least important first
    pub const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Decode the raw representation stored in an atomic
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Debug),
            1 => Some(Self::Info),
            2 => Some(Self::Warn),
            3 => Some(Self::Error),
            _ => None,
        }
    }

    /// Parse a level name, falling back to [`Severity::Info`] for anything
    /// unrecognized.
    #[must_use]
    pub fn parse_lossy(name: &str) -> Self {
        name.parse().unwrap_or(Self::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a level name is not one of the known severities
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("debug") {
            Ok(Self::Debug)
        } else if name.eq_ignore_ascii_case("info") {
            Ok(Self::Info)
        } else if name.eq_ignore_ascii_case("warn") || name.eq_ignore_ascii_case("warning") {
            Ok(Self::Warn)
        } else if name.eq_ignore_ascii_case("error") {
            Ok(Self::Error)
        } else {
            Err(ParseSeverityError(s.to_string()))
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl From<Severity> for tracing::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => Self::DEBUG,
            Severity::Info => Self::INFO,
            Severity::Warn => Self::WARN,
            Severity::Error => Self::ERROR,
        }
    }
}

impl From<Severity> for LevelFilter {
    fn from(severity: Severity) -> Self {
        Self::from_level(severity.into())
    }
}

/// Display label and optional color escape for one severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelFormat {
    /// Fixed-width label, e.g. `"INFO "`
    pub label: String,
    /// ANSI escape written before the label; empty for none
    #[serde(default)]
    pub color: String,
}

impl LevelFormat {
    /// Create a format from a label and a color escape
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Per-severity display table
///
/// Every merged [`Config`](crate::Config) owns its own table, so overriding an
/// entry on one logger never leaks into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelFormats(BTreeMap<Severity, LevelFormat>);

impl LevelFormats {
    /// An empty table; every severity renders with its canonical name
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock five-column table with blue/green/yellow/red colors
    #[must_use]
    pub fn standard() -> Self {
        Self(BTreeMap::from([
            (Severity::Debug, LevelFormat::new("DEBUG", "\x1b[34m")),
            (Severity::Info, LevelFormat::new("INFO ", "\x1b[32m")),
            (Severity::Warn, LevelFormat::new("WARN ", "\x1b[33m")),
            (Severity::Error, LevelFormat::new("ERROR", "\x1b[31m")),
        ]))
    }

    /// Look up the entry for `severity`
    #[must_use]
    pub fn get(&self, severity: Severity) -> Option<&LevelFormat> {
        self.0.get(&severity)
    }

    /// Set the entry for `severity`, returning the previous one
    pub fn insert(&mut self, severity: Severity, format: LevelFormat) -> Option<LevelFormat> {
        self.0.insert(severity, format)
    }

    /// Overlay `other` onto this table, overwriting entries by key
    pub fn overlay(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of configured entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if no entry is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the label for `severity`.
    ///
    /// A configured entry is wrapped in its color escape and [`RESET`] when
    /// `colored` is set. A missing entry falls back to the canonical name and
    /// is never colored.
    #[must_use]
    pub fn render(&self, severity: Severity, colored: bool) -> String {
        match self.get(severity) {
            Some(format) if colored => format!("{}{}{RESET}", format.color, format.label),
            Some(format) => format.label.clone(),
            None => severity.as_str().to_string(),
        }
    }
}

impl FromIterator<(Severity, LevelFormat)> for LevelFormats {
    fn from_iter<I: IntoIterator<Item = (Severity, LevelFormat)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
