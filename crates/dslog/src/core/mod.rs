//! Core error types for dslog.
//!
//! ### [`error`] - Error handling
//! [`LogError`] covers the three ways setting up a logger can fail: bad
//! configuration, an unusable file sink, and API misuse.
//!
//! ### [`result`] - Result extensions
//! Helpers that attach context when converting `std::io` failures.

pub mod error;
pub mod result;

pub use error::{LogError, LogResult};
pub use result::LogIoResultExt;
