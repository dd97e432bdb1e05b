//! Bridge from `tracing` to a [`Logger`]
//!
//! Installing [`DualSinkLayer`] in a subscriber routes `tracing` events
//! through the logger's console and file sinks. The event's `message` becomes
//! the log message and every other field becomes a call-site field.

use std::fmt;

use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::encoder::Caller;
use crate::field::{Field, Value};
use crate::level::Severity;
use crate::logger::Logger;

/// `tracing_subscriber` layer forwarding events to a [`Logger`]
#[derive(Debug, Clone)]
pub struct DualSinkLayer {
    logger: Logger,
}

impl DualSinkLayer {
    /// Forward events to `logger`
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// The receiving logger
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl<S: Subscriber> Layer<S> for DualSinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = Severity::from(*metadata.level());
        if !self.logger.enabled(severity) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let caller = metadata
            .file()
            .zip(metadata.line())
            .map(|(file, line)| Caller { file, line });
        self.logger
            .dispatch(severity, &visitor.message, &visitor.fields, caller);
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<Field>,
}

impl EventVisitor {
    fn push(&mut self, field: &TracingField, value: Value) {
        self.fields.push(Field {
            key: field.name().to_string(),
            value,
        });
    }
}

impl Visit for EventVisitor {
    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, Value::F64(value));
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, Value::U64(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::error(value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push(field, Value::Str(format!("{value:?}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{LoggerBuilder, LoggerOption};
    use crate::writer::CaptureWriter;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    fn logger(level: &str) -> (Logger, CaptureWriter) {
        let capture = CaptureWriter::new();
        let logger = LoggerBuilder::new()
            .level(level)
            .console_only()
            .options([
                LoggerOption::ConsoleWriter(capture.boxed()),
                LoggerOption::ServiceName("api".to_string()),
            ])
            .build()
            .unwrap();
        (logger, capture)
    }

    #[test]
    fn forwards_message_and_fields() {
        let (logger, capture) = logger("info");
        let subscriber = Registry::default().with(DualSinkLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(port = 8080, tls = false, "started");
        });

        let out = capture.contents();
        assert!(out.contains("[api] started | port: 8080 | tls: false"));
        assert!(out.contains("layer.rs:"));
    }

    #[test]
    fn respects_logger_level() {
        let (logger, capture) = logger("warn");
        let subscriber = Registry::default().with(DualSinkLayer::new(logger.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::trace!("hidden");
            tracing::error!(code = 7_u64, "boom");
        });

        assert_eq!(capture.lines().len(), 1);
        assert!(capture.contents().contains("boom | code: 7"));

        logger.set_level(Severity::Debug);
        let subscriber = Registry::default().with(DualSinkLayer::new(logger));
        tracing::subscriber::with_default(subscriber, || tracing::debug!("visible"));
        assert_eq!(capture.lines().len(), 2);
    }
}
