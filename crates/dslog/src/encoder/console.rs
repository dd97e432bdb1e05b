//! Separator-joined text encoder

use std::io::{self, Write as _};

use super::{Encode, FieldObject, Record};
use crate::config::EncoderConfig;

/// Renders `time SEP level SEP caller SEP message`, one record per line.
///
/// Elements whose key is empty in the [`EncoderConfig`] are left out. Fields
/// attached to the sink are appended as a JSON object after another
/// separator.
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    /// Create an encoder for `config`
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// The rendering rules in use
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Encode for ConsoleEncoder {
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
        let cfg = &self.config;
        let mut first = true;
        let mut element = |buf: &mut Vec<u8>, text: &str| {
            if !first {
                buf.extend_from_slice(cfg.separator.as_bytes());
            }
            first = false;
            buf.extend_from_slice(text.as_bytes());
        };

        if !cfg.time_key.is_empty() {
            element(buf, &cfg.time_encoding.format(record.time));
        }
        if !cfg.level_key.is_empty() {
            element(buf, &cfg.render_level(record.severity));
        }
        if let Some(caller) = record.caller.filter(|_| !cfg.caller_key.is_empty()) {
            element(buf, &caller.to_string());
        }
        if !cfg.message_key.is_empty() {
            element(buf, record.message);
        }
        if record.has_fields() {
            element(buf, "");
            serde_json::to_writer(&mut *buf, &FieldObject(record))?;
        }

        buf.write_all(b"\n")
    }
}
