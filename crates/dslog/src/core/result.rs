//! Result extension traits for I/O performed by sinks

use crate::core::error::{LogError, LogResult};

/// Extension trait for `std::io` results
pub trait LogIoResultExt<T> {
    /// Convert to [`LogResult`], describing the failed operation
    fn with_log_context<S: Into<String>, F>(self, f: F) -> LogResult<T>
    where
        F: FnOnce() -> S;
}

impl<T> LogIoResultExt<T> for Result<T, std::io::Error> {
    fn with_log_context<S: Into<String>, F>(self, f: F) -> LogResult<T>
    where
        F: FnOnce() -> S,
    {
        self.map_err(|e| LogError::io(f(), e))
    }
}
