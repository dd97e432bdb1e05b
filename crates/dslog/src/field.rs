//! Typed key/value fields and their text rendering

use std::fmt::{self, Write as _};
use std::time::Duration;

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{LogError, LogResult};

/// Value carried by a [`Field`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text
    Str(String),
    /// Signed integer
    I64(i64),
    /// Unsigned integer
    U64(u64),
    /// Floating point number
    F64(f64),
    /// Boolean
    Bool(bool),
    /// Elapsed time, rendered like `1.5s`
    Duration(Duration),
    /// Point in time, rendered as RFC 3339
    Time(OffsetDateTime),
    /// Rendered error message
    Error(String),
    /// Nested structure
    Json(serde_json::Value),
}

impl Value {
    /// Capture an error by its display message
    pub fn error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::Error(err.to_string())
    }

    /// Short name of the variant, used in usage errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F64(_) => "f64",
            Self::Bool(_) => "bool",
            Self::Duration(_) => "duration",
            Self::Time(_) => "time",
            Self::Error(_) => "error",
            Self::Json(_) => "json",
        }
    }

    fn rfc3339(at: &OffsetDateTime) -> String {
        at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) | Self::Error(s) => f.write_str(s),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Duration(d) => write!(f, "{d:?}"),
            Self::Time(at) => f.write_str(&Self::rfc3339(at)),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) | Self::Error(s) => serializer.serialize_str(s),
            Self::I64(v) => serializer.serialize_i64(*v),
            Self::U64(v) => serializer.serialize_u64(*v),
            Self::F64(v) => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Duration(d) => serializer.collect_str(&format_args!("{d:?}")),
            Self::Time(at) => serializer.serialize_str(&Self::rfc3339(at)),
            Self::Json(v) => v.serialize(serializer),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

value_from!(I64 as i64: i8, i16, i32, i64);
value_from!(U64 as u64: u8, u16, u32, u64);
value_from!(F64 as f64: f32, f64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::I64(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::U64(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Self::Time(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// A key/value pair attached to a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name; duplicates are allowed and kept in order
    pub key: String,
    /// Field payload
    pub value: Value,
}

impl Field {
    /// Create a field
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build fields from a flat `key, value, key, value, ...` list.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Usage`] if the list has an odd length or a key
    /// position holds anything other than a string.
    pub fn from_pairs(items: impl IntoIterator<Item = Value>) -> LogResult<Vec<Self>> {
        let items: Vec<Value> = items.into_iter().collect();
        if items.len() % 2 != 0 {
            return Err(LogError::usage(format!(
                "fields require an even number of arguments (key-value pairs), got {}",
                items.len()
            )));
        }

        let mut fields = Vec::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            match key {
                Value::Str(key) => fields.push(Self { key, value }),
                other => {
                    return Err(LogError::usage(format!(
                        "field key must be a string, got {}",
                        other.kind()
                    )));
                }
            }
        }
        Ok(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Render fields as `key<kv_sep>value` joined by `pair_sep`.
///
/// Separators that occur inside values are not escaped.
pub fn format_fields(fields: &[Field], kv_sep: &str, pair_sep: &str) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(pair_sep);
        }
        let _ = write!(out, "{}{kv_sep}{}", field.key, field.value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_fields_render_empty() {
        assert_eq!(format_fields(&[], "=", " | "), "");
    }

    #[test]
    fn pairs_are_joined_in_order() {
        let fields = [Field::new("a", "1"), Field::new("b", "2")];
        assert_eq!(format_fields(&fields, "=", " | "), "a=1 | b=2");
    }

    #[test]
    fn duplicate_keys_render_twice() {
        let fields = [Field::new("k", 1), Field::new("k", 2)];
        assert_eq!(format_fields(&fields, ": ", ", "), "k: 1, k: 2");
    }

    #[test]
    fn separators_inside_values_are_not_escaped() {
        let fields = [Field::new("msg", "a=b")];
        assert_eq!(format_fields(&fields, "=", " "), "msg=a=b");
    }

    #[test]
    fn values_use_display_rendering() {
        let fields = [
            Field::new("port", 8080),
            Field::new("ok", true),
            Field::new("ratio", 0.5),
            Field::new("took", Duration::from_millis(1500)),
            Field::new("tags", serde_json::json!(["a", "b"])),
        ];
        assert_eq!(
            format_fields(&fields, "=", " "),
            r#"port=8080 ok=true ratio=0.5 took=1.5s tags=["a","b"]"#
        );
    }

    #[test]
    fn errors_render_their_message() {
        let err = std::io::Error::other("disk full");
        assert_eq!(Value::error(&err).to_string(), "disk full");
    }

    #[test]
    fn from_pairs_builds_fields() {
        let fields = Field::from_pairs(["a".into(), "1".into(), "b".into(), 2.into()]).unwrap();
        assert_eq!(fields, vec![Field::new("a", "1"), Field::new("b", 2)]);
    }

    #[test]
    fn from_pairs_rejects_odd_length() {
        let err = Field::from_pairs(["a".into(), "1".into(), "dangling".into()]).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn from_pairs_rejects_non_string_key() {
        let err = Field::from_pairs([Value::from(1), "x".into()]).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("got i64"));
    }

    #[test]
    fn values_serialize_to_json_types() {
        let json = serde_json::to_string(&[
            Value::from("s"),
            Value::from(-3),
            Value::from(7_u64),
            Value::from(true),
            Value::from(Duration::from_secs(2)),
        ])
        .unwrap();
        assert_eq!(json, r#"["s",-3,7,true,"2s"]"#);
    }
}
