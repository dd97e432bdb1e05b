//! Record encoders
//!
//! An [`Encode`] implementation turns one [`Record`] into the bytes of one
//! line. [`ConsoleEncoder`] renders separator-joined text (used for the
//! console and for text files); [`JsonEncoder`] renders one JSON object.

mod console;
mod json;

use std::fmt;
use std::io;
use std::panic::Location;

use serde::ser::{Serialize, SerializeMap, Serializer};
use time::OffsetDateTime;

use crate::field::Field;
use crate::level::Severity;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

/// Turns records into bytes
pub trait Encode: Send + Sync + fmt::Debug {
    /// Append the encoded form of `record`, including the trailing newline,
    /// to `buf`.
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()>;
}

/// Source location of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Source file as reported by the compiler
    pub file: &'static str,
    /// Line number
    pub line: u32,
}

impl Caller {
    /// Location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    #[must_use]
    pub fn here() -> Self {
        Location::caller().into()
    }

    /// The last two path components of [`Caller::file`]
    #[must_use]
    pub fn short_file(&self) -> &'static str {
        let file = self.file;
        let mut separators = file.rmatch_indices(['/', '\\']).map(|(i, _)| i);
        match (separators.next(), separators.next()) {
            (Some(_), Some(second)) => &file[second + 1..],
            _ => file,
        }
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}

/// One log record as seen by an encoder
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// When the record was created
    pub time: OffsetDateTime,
    /// Record severity
    pub severity: Severity,
    /// Fully composed message
    pub message: &'a str,
    /// Call site, when caller reporting is enabled
    pub caller: Option<Caller>,
    /// Fields attached to the sink itself, written before `fields`
    pub context: &'a [Field],
    /// Structured fields of this record
    pub fields: &'a [Field],
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current UTC time
    #[must_use]
    pub fn new(severity: Severity, message: &'a str) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            severity,
            message,
            caller: None,
            context: &[],
            fields: &[],
        }
    }

    /// `true` if the record carries any structured field
    #[must_use]
    pub fn has_fields(&self) -> bool {
        !self.context.is_empty() || !self.fields.is_empty()
    }

    pub(crate) fn all_fields(&self) -> impl Iterator<Item = &'a Field> {
        self.context.iter().chain(self.fields)
    }
}

/// Serializes the record's fields as one JSON object in insertion order
pub(crate) struct FieldObject<'r, 'a>(pub &'r Record<'a>);

impl Serialize for FieldObject<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in self.0.all_fields() {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("crates/dslog/src/logger.rs", "src/logger.rs")]
    #[case("src/main.rs", "src/main.rs")]
    #[case("main.rs", "main.rs")]
    #[case(r"C:\work\app\src\lib.rs", r"src\lib.rs")]
    fn short_file_keeps_two_components(#[case] file: &'static str, #[case] expected: &str) {
        let caller = Caller { file, line: 7 };
        assert_eq!(caller.short_file(), expected);
        assert_eq!(caller.to_string(), format!("{expected}:7"));
    }

    #[test]
    fn here_reports_this_file() {
        let caller = Caller::here();
        assert!(caller.file.ends_with("mod.rs"));
        assert!(caller.line > 0);
    }
}
