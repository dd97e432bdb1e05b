//! JSON lines encoder

use std::io::{self, Write as _};

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{Encode, Record};
use crate::config::EncoderConfig;

/// Renders each record as one JSON object per line.
///
/// Keys are written in a fixed order: time, level, caller, message, then the
/// sink's fields and the record's fields in insertion order. Duplicate keys
/// are written as they come. Level labels are trimmed of their column
/// padding.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    /// Create an encoder for `config`
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// The rendering rules in use
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

struct Line<'r, 'a> {
    config: &'r EncoderConfig,
    record: &'r Record<'a>,
}

impl Serialize for Line<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cfg = self.config;
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;

        if !cfg.time_key.is_empty() {
            map.serialize_entry(&cfg.time_key, &cfg.time_encoding.format(record.time))?;
        }
        if !cfg.level_key.is_empty() {
            let level = cfg.render_level(record.severity);
            map.serialize_entry(&cfg.level_key, level.trim_end())?;
        }
        if let Some(caller) = record.caller.filter(|_| !cfg.caller_key.is_empty()) {
            map.serialize_entry(&cfg.caller_key, &caller.to_string())?;
        }
        if !cfg.message_key.is_empty() {
            map.serialize_entry(&cfg.message_key, record.message)?;
        }
        for field in record.all_fields() {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

impl Encode for JsonEncoder {
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
        serde_json::to_writer(
            &mut *buf,
            &Line {
                config: &self.config,
                record,
            },
        )?;
        buf.write_all(b"\n")
    }
}
