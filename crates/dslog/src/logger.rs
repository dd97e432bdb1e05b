//! The dual-sink logger
//!
//! A [`Logger`] is a cheap handle (`Arc` inside); cloning it yields another
//! handle to the same logger, sharing its level. Deriving a logger with
//! [`Logger::with_fields`], [`Logger::with_service`] or
//! [`Logger::with_context`] builds a new logger value instead: it shares the
//! configuration, byte-sinks and rotation controller of its parent, but owns
//! its level and field list.
//!
//! # Concurrency
//!
//! Logging calls never block on the logger itself. The sink pair is read
//! through one [`ArcSwap`] snapshot per call, so a concurrent
//! [`Logger::set_level`] is observed either entirely or not at all.
//! `set_level` calls on the same logger are serialized by a mutex.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::compose::MessageComposer;
use crate::config::Config;
use crate::context::Context;
use crate::core::LogResult;
use crate::encoder::Caller;
use crate::field::{Field, Value};
use crate::level::Severity;
use crate::rotation::RotatingFile;
use crate::sink::{Sink, SinkOption};

/// Console sink and optional file sink, always swapped together
#[derive(Debug, Clone)]
pub(crate) struct Sinks {
    pub(crate) console: Sink,
    pub(crate) file: Option<Sink>,
}

impl Sinks {
    fn with_threshold(&self, threshold: Severity) -> Self {
        Self {
            console: self.console.with_threshold(threshold),
            file: self.file.as_ref().map(|file| file.with_threshold(threshold)),
        }
    }

    fn with_options(&self, options: &[SinkOption]) -> Self {
        Self {
            console: self.console.with_options(options),
            file: self.file.as_ref().map(|file| file.with_options(options)),
        }
    }

    /// The shared threshold; both sinks always carry the same one
    fn threshold(&self) -> Severity {
        self.console.threshold()
    }

    fn enabled(&self, severity: Severity) -> bool {
        self.console.enabled(severity)
            || self.file.as_ref().is_some_and(|file| file.enabled(severity))
    }
}

struct Inner {
    config: Arc<Config>,
    rotation: Option<Arc<RotatingFile>>,
    service: String,
    level: AtomicU8,
    fields: Arc<[Field]>,
    sinks: ArcSwap<Sinks>,
    reload: Mutex<()>,
}

/// Structured logger writing to the console and, optionally, a rotating file
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    pub(crate) fn from_parts(
        config: Arc<Config>,
        rotation: Option<Arc<RotatingFile>>,
        service: String,
        fields: Arc<[Field]>,
        sinks: Sinks,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                rotation,
                service,
                level: AtomicU8::new(sinks.threshold() as u8),
                fields,
                sinks: ArcSwap::from_pointee(sinks),
                reload: Mutex::new(()),
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The merged configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Current level
    pub fn level(&self) -> Severity {
        Severity::from_u8(self.inner.level.load(Ordering::Acquire)).unwrap_or(Severity::Info)
    }

    /// Service name, empty if none
    pub fn service_name(&self) -> &str {
        &self.inner.service
    }

    /// Persistent fields, in the order they were attached
    pub fn fields(&self) -> &[Field] {
        &self.inner.fields
    }

    /// Rotation controller of the file sink
    pub fn rotation(&self) -> Option<&Arc<RotatingFile>> {
        self.inner.rotation.as_ref()
    }

    /// `true` if records are also written to a file
    pub fn has_file_sink(&self) -> bool {
        self.inner.sinks.load().file.is_some()
    }

    // ========================================================================
    // Level control
    // ========================================================================

    /// Change the level of this logger.
    ///
    /// Rebuilds both sinks with the new threshold and publishes them
    /// together. Returns `false` without rebuilding anything if the logger is
    /// already at `level`.
    pub fn set_level(&self, level: Severity) -> bool {
        let _guard = self.inner.reload.lock();
        if self.level() == level {
            return false;
        }

        self.inner.level.store(level as u8, Ordering::Release);
        let rebuilt = self.inner.sinks.load().with_threshold(level);
        self.inner.sinks.store(Arc::new(rebuilt));
        true
    }

    /// [`Logger::set_level`] from a level name; unknown names mean `info`
    pub fn set_level_str(&self, level: &str) -> bool {
        self.set_level(Severity::parse_lossy(level))
    }

    // ========================================================================
    // Logging
    // ========================================================================

    /// `true` if a record at `severity` would reach at least one sink
    pub fn enabled(&self, severity: Severity) -> bool {
        self.inner.sinks.load().enabled(severity)
    }

    /// Log `message` at `severity` with call-site `fields`
    #[track_caller]
    pub fn log(&self, severity: Severity, message: &str, fields: &[Field]) {
        self.dispatch(severity, message, fields, Some(Caller::here()));
    }

    /// Log at debug level
    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Debug, message, fields);
    }

    /// Log at info level
    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Info, message, fields);
    }

    /// Log at warn level
    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Warn, message, fields);
    }

    /// Log at error level
    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Error, message, fields);
    }

    pub(crate) fn dispatch(
        &self,
        severity: Severity,
        message: &str,
        fields: &[Field],
        caller: Option<Caller>,
    ) {
        let sinks = self.inner.sinks.load();
        if !sinks.enabled(severity) {
            return;
        }

        let composed = self.composer().compose(message, fields);
        sinks.console.write(severity, &composed.console, &[], caller);
        if let Some(file) = &sinks.file {
            file.write(severity, &composed.file, &composed.json_fields, caller);
        }
    }

    fn composer(&self) -> MessageComposer<'_> {
        MessageComposer::new(&self.inner.config, &self.inner.service, &self.inner.fields)
    }

    // ========================================================================
    // Derived loggers
    // ========================================================================

    fn fork(&self, service: String, fields: Arc<[Field]>, sinks: Sinks) -> Self {
        Self::from_parts(
            Arc::clone(&self.inner.config),
            self.inner.rotation.clone(),
            service,
            fields,
            sinks,
        )
    }

    /// New logger whose persistent fields are this logger's followed by
    /// `fields`
    #[must_use]
    pub fn with_fields(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let fields: Vec<Field> = self.inner.fields.iter().cloned().chain(fields).collect();
        let sinks = Sinks::clone(&self.inner.sinks.load());
        self.fork(self.inner.service.clone(), fields.into(), sinks)
    }

    /// [`Logger::with_fields`] from a flat `key, value, ...` list.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Usage`](crate::LogError::Usage) for an odd-length
    /// list or a non-string key.
    pub fn try_with_pairs(&self, pairs: impl IntoIterator<Item = Value>) -> LogResult<Self> {
        Ok(self.with_fields(Field::from_pairs(pairs)?))
    }

    /// New logger without persistent fields
    #[must_use]
    pub fn clear_fields(&self) -> Self {
        let sinks = Sinks::clone(&self.inner.sinks.load());
        self.fork(self.inner.service.clone(), Arc::from([]), sinks)
    }

    /// New logger decorated with a service name.
    ///
    /// JSON file sinks additionally get a permanent `service` field.
    #[must_use]
    pub fn with_service(&self, name: impl Into<String>) -> Self {
        self.with_service_options(name, &[])
    }

    /// [`Logger::with_service`], also applying `options` to both sinks
    #[must_use]
    pub fn with_service_options(&self, name: impl Into<String>, options: &[SinkOption]) -> Self {
        let name = name.into();
        let mut sinks = self.inner.sinks.load().with_options(options);
        if self.inner.config.is_json() {
            sinks.file = sinks
                .file
                .map(|file| file.with_context_replaced(Field::new("service", name.as_str())));
        }
        self.fork(name, Arc::clone(&self.inner.fields), sinks)
    }

    /// Attach the correlation identifiers of `ctx`, if it has any;
    /// otherwise return a handle to this same logger
    #[must_use]
    pub fn with_context(&self, ctx: &Context) -> Self {
        if ctx.is_empty() {
            self.clone()
        } else {
            self.with_fields(ctx.fields())
        }
    }

    /// [`Logger::with_context`] using the thread's current [`Context`]
    #[must_use]
    pub fn with_current_context(&self) -> Self {
        self.with_context(&Context::current())
    }

    // ========================================================================
    // File sink
    // ========================================================================

    /// Force the file sink to rotate; does nothing without a file sink
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) if the rotation fails.
    pub fn rotate(&self) -> LogResult<()> {
        match &self.inner.rotation {
            Some(rotation) => rotation.rotate(),
            None => Ok(()),
        }
    }

    /// Flush the file sink to disk; does nothing without a file sink
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) if the sync fails.
    pub fn sync(&self) -> LogResult<()> {
        match &self.inner.rotation {
            Some(rotation) => rotation.sync(),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn sinks(&self) -> Arc<Sinks> {
        self.inner.sinks.load_full()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("service", &self.inner.service)
            .field("fields", &self.inner.fields)
            .field("file", &self.inner.rotation.as_ref().map(|r| r.path()))
            .finish_non_exhaustive()
    }
}
