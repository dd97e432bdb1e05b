//! Message composition
//!
//! Turns a raw message and the call-site fields into the text each sink
//! writes. Console and text-file output get the fields flattened into the
//! message; JSON output keeps the message bare and hands the fields over
//! unformatted.

use crate::config::Config;
use crate::field::{Field, format_fields};

/// Output of [`MessageComposer::compose`]
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    /// Text for the console sink
    pub console: String,
    /// Text for the file sink
    pub file: String,
    /// Structured fields for a JSON file sink; empty for text output
    pub json_fields: Vec<Field>,
}

/// Read-only view of the logger state that shapes a message
#[derive(Debug, Clone, Copy)]
pub struct MessageComposer<'a> {
    config: &'a Config,
    service: &'a str,
    persistent: &'a [Field],
}

impl<'a> MessageComposer<'a> {
    /// Compose against `config`, a service name (empty for none) and the
    /// logger's persistent fields
    pub fn new(config: &'a Config, service: &'a str, persistent: &'a [Field]) -> Self {
        Self {
            config,
            service,
            persistent,
        }
    }

    /// `message` with the decorated service name in front, if there is one
    pub fn decorate(&self, message: &str) -> String {
        if self.service.is_empty() {
            return message.to_string();
        }
        let [prefix, suffix] = &self.config.service_name_decorators;
        format!("{prefix}{}{suffix} {message}", self.service)
    }

    /// Build the console text, the file text and the JSON fields for one
    /// record.
    ///
    /// JSON files get the bare message; the service travels as a structured
    /// field there instead of as a prefix.
    pub fn compose(&self, raw: &str, call_fields: &[Field]) -> Composed {
        let message = self.decorate(raw);
        let all_fields: Vec<Field> = self
            .persistent
            .iter()
            .chain(call_fields)
            .cloned()
            .collect();

        let console = if all_fields.is_empty() {
            message.clone()
        } else {
            let sep = &self.config.console_separator;
            format!(
                "{message}{sep}{}",
                format_fields(&all_fields, &self.config.field_separator, sep)
            )
        };

        if self.config.is_json() {
            Composed {
                console,
                file: raw.to_string(),
                json_fields: all_fields,
            }
        } else {
            Composed {
                file: console.clone(),
                console,
                json_fields: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use pretty_assertions::assert_eq;

    fn config(format: LogFormat) -> Config {
        crate::config::merge(Config {
            log_file_format: Some(format),
            ..Config::default()
        })
    }

    #[test]
    fn bare_message_passes_through() {
        let config = config(LogFormat::Text);
        let composed = MessageComposer::new(&config, "", &[]).compose("hello", &[]);

        assert_eq!(composed.console, "hello");
        assert_eq!(composed.file, "hello");
        assert!(composed.json_fields.is_empty());
    }

    #[test]
    fn text_output_flattens_persistent_then_call_fields() {
        let config = config(LogFormat::Text);
        let persistent = [Field::new("req", "r-1")];
        let composed = MessageComposer::new(&config, "api", &persistent)
            .compose("started", &[Field::new("port", 8080)]);

        assert_eq!(composed.console, "[api] started | req: r-1 | port: 8080");
        assert_eq!(composed.file, composed.console);
    }

    #[test]
    fn json_output_keeps_fields_structured() {
        let config = config(LogFormat::Json);
        let persistent = [Field::new("req", "r-1")];
        let composed = MessageComposer::new(&config, "api", &persistent)
            .compose("started", &[Field::new("port", 8080)]);

        assert_eq!(composed.console, "[api] started | req: r-1 | port: 8080");
        assert_eq!(composed.file, "started");
        assert_eq!(
            composed.json_fields,
            vec![Field::new("req", "r-1"), Field::new("port", 8080)]
        );
    }

    #[test]
    fn custom_decorators_and_separators() {
        let config = crate::config::merge(Config {
            service_name_decorators: [String::new(), ":".to_string()],
            console_separator: " ~ ".to_string(),
            field_separator: "=".to_string(),
            ..Config::default()
        });
        let composed = MessageComposer::new(&config, "worker", &[])
            .compose("tick", &[Field::new("n", 1), Field::new("ok", true)]);

        assert_eq!(composed.console, "worker: tick ~ n=1 ~ ok=true");
    }
}
