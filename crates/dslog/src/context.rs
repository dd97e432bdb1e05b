//! Correlation context for request-scoped loggers
//!
//! # Thread-Local Storage
//!
//! The current context is stored in thread-local storage and is **not**
//! propagated across `.await` points in work-stealing async runtimes. Pass a
//! [`Context`] explicitly to [`Logger::with_context`](crate::Logger::with_context)
//! in that case.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Correlation identifiers carried alongside a unit of work
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Request ID
    pub request_id: Option<String>,
    /// Trace ID
    pub trace_id: Option<String>,
}

impl Context {
    /// Create a new empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request ID
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Set trace ID
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// `true` if neither identifier is set to a non-empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.request_id, &self.trace_id]
            .into_iter()
            .all(|id| id.as_deref().is_none_or(str::is_empty))
    }

    /// `request_id` and `trace_id` fields, or nothing for an empty context.
    ///
    /// When only one identifier is known the other is written as an empty
    /// string so records always carry both keys.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![
            Field::new("request_id", self.request_id.clone().unwrap_or_default()),
            Field::new("trace_id", self.trace_id.clone().unwrap_or_default()),
        ]
    }

    /// Set as current context
    #[must_use]
    pub fn set_current(self) -> ContextGuard {
        CONTEXT.with(|ctx| {
            let old = ctx.replace(Arc::new(self));
            ContextGuard {
                old: Some(old),
                _not_send: PhantomData,
            }
        })
    }

    /// Get current context (cheap `Arc::clone`, no deep copy)
    #[inline]
    #[must_use]
    pub fn current() -> Arc<Self> {
        CONTEXT.with(|ctx| Arc::clone(&ctx.borrow()))
    }

    /// Run a closure with this context
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        let _guard = self.set_current();
        f()
    }
}

thread_local! {
    static CONTEXT: RefCell<Arc<Context>> = RefCell::new(Arc::new(Context::default()));
}

/// RAII guard that restores previous context on drop
///
/// This guard is `!Send` because it references thread-local storage.
#[derive(Debug)]
pub struct ContextGuard {
    old: Option<Arc<Context>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(old) = self.old.take() {
            CONTEXT.with(|ctx| {
                *ctx.borrow_mut() = old;
            });
        }
    }
}
