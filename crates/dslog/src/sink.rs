//! Leveled writers
//!
//! A [`Sink`] binds an [`Encode`] implementation to a byte-sink and a
//! severity threshold. Sinks are immutable: changing the threshold or adding
//! fields produces a new sink sharing the same encoder and byte-sink.

use std::fmt;
use std::io::Write as _;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::encoder::{Caller, Encode, Record};
use crate::field::Field;
use crate::level::Severity;

/// Adjustment applied when a sink is rebuilt
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOption {
    /// Report (or stop reporting) the call site
    Caller(bool),
    /// Attach fields to every record written by the sink
    Fields(Vec<Field>),
}

/// Encoder + byte-sink + threshold
#[derive(Clone)]
pub struct Sink {
    encoder: Arc<dyn Encode>,
    writer: Arc<BoxMakeWriter>,
    threshold: Severity,
    context: Arc<[Field]>,
    caller: bool,
}

impl Sink {
    /// Create a sink that reports call sites and has no fields of its own
    pub fn new(encoder: Arc<dyn Encode>, writer: BoxMakeWriter, threshold: Severity) -> Self {
        Self {
            encoder,
            writer: Arc::new(writer),
            threshold,
            context: Arc::from([]),
            caller: true,
        }
    }

    /// Minimum severity written by this sink
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Fields written with every record
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    /// Whether call sites are reported
    pub fn reports_caller(&self) -> bool {
        self.caller
    }

    /// `true` if a record at `severity` passes the threshold
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Same sink with another threshold
    #[must_use]
    pub fn with_threshold(&self, threshold: Severity) -> Self {
        Self {
            threshold,
            ..self.clone()
        }
    }

    /// Same sink with `fields` appended to its own fields
    #[must_use]
    pub fn with_context(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let context: Vec<Field> = self.context.iter().cloned().chain(fields).collect();
        Self {
            context: context.into(),
            ..self.clone()
        }
    }

    /// Same sink with `field` replacing any of its own fields under the same
    /// key
    #[must_use]
    pub fn with_context_replaced(&self, field: Field) -> Self {
        let key = field.key.clone();
        let context: Vec<Field> = self
            .context
            .iter()
            .filter(|existing| existing.key != key)
            .cloned()
            .chain([field])
            .collect();
        Self {
            context: context.into(),
            ..self.clone()
        }
    }

    /// Same sink with every option in `options` applied in order
    #[must_use]
    pub fn with_options(&self, options: &[SinkOption]) -> Self {
        options.iter().fold(self.clone(), |sink, option| match option {
            SinkOption::Caller(enabled) => Self {
                caller: *enabled,
                ..sink
            },
            SinkOption::Fields(fields) => sink.with_context(fields.iter().cloned()),
        })
    }

    /// Encode and write one record if it passes the threshold.
    ///
    /// Encoding and I/O failures are dropped; logging never fails from the
    /// caller's point of view.
    pub fn write(
        &self,
        severity: Severity,
        message: &str,
        fields: &[Field],
        caller: Option<Caller>,
    ) {
        if !self.enabled(severity) {
            return;
        }

        let record = Record {
            caller: caller.filter(|_| self.caller),
            context: &self.context,
            fields,
            ..Record::new(severity, message)
        };

        let mut buf = Vec::with_capacity(256);
        if self.encoder.encode(&record, &mut buf).is_ok() {
            let _ = self.writer.make_writer().write_all(&buf);
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("encoder", &self.encoder)
            .field("threshold", &self.threshold)
            .field("context", &self.context)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::encoder::{ConsoleEncoder, JsonEncoder};
    use crate::writer::CaptureWriter;

    const HERE: Option<Caller> = Some(Caller {
        file: "src/app.rs",
        line: 9,
    });

    fn plain_sink(capture: &CaptureWriter, threshold: Severity) -> Sink {
        let mut config = Config::defaults().file;
        config.time_key.clear();
        Sink::new(
            Arc::new(ConsoleEncoder::new(config)),
            capture.boxed(),
            threshold,
        )
    }

    #[test]
    fn gates_on_threshold() {
        let capture = CaptureWriter::new();
        let sink = plain_sink(&capture, Severity::Warn);

        sink.write(Severity::Info, "quiet", &[], HERE);
        sink.write(Severity::Error, "loud", &[], HERE);

        assert_eq!(capture.lines(), ["ERROR | src/app.rs:9 | loud"]);
    }

    #[test]
    fn rebuilt_threshold_keeps_encoder_and_writer() {
        let capture = CaptureWriter::new();
        let sink = plain_sink(&capture, Severity::Error).with_threshold(Severity::Debug);

        sink.write(Severity::Debug, "now visible", &[], HERE);
        assert_eq!(capture.lines(), ["DEBUG | src/app.rs:9 | now visible"]);
    }

    #[test]
    fn options_apply_in_order() {
        let capture = CaptureWriter::new();
        let sink = plain_sink(&capture, Severity::Debug).with_options(&[
            SinkOption::Caller(false),
            SinkOption::Fields(vec![Field::new("region", "eu")]),
        ]);

        assert!(!sink.reports_caller());
        sink.write(Severity::Info, "hello", &[], HERE);
        assert_eq!(capture.lines(), [r#"INFO  | hello | {"region":"eu"}"#]);
    }

    #[test]
    fn replaced_context_keeps_one_entry_per_key() {
        let capture = CaptureWriter::new();
        let sink = plain_sink(&capture, Severity::Debug)
            .with_options(&[SinkOption::Caller(false)])
            .with_context([Field::new("region", "eu")])
            .with_context_replaced(Field::new("service", "a"))
            .with_context_replaced(Field::new("service", "b"));

        assert_eq!(
            sink.context(),
            [Field::new("region", "eu"), Field::new("service", "b")]
        );
        sink.write(Severity::Info, "hi", &[], HERE);
        assert_eq!(
            capture.lines(),
            [r#"INFO  | hi | {"region":"eu","service":"b"}"#]
        );
    }

    #[test]
    fn json_sink_writes_context_before_fields() {
        let capture = CaptureWriter::new();
        let sink = Sink::new(
            Arc::new(JsonEncoder::new(Config::defaults().file)),
            capture.boxed(),
            Severity::Debug,
        )
        .with_context([Field::new("service", "api")]);

        sink.write(Severity::Info, "started", &[Field::new("port", 8080)], HERE);

        let line: serde_json::Value = serde_json::from_str(&capture.lines()[0]).unwrap();
        assert_eq!(line["service"], "api");
        assert_eq!(line["port"], 8080);
        assert_eq!(line["message"], "started");
        assert_eq!(line["caller"], "src/app.rs:9");
    }
}
