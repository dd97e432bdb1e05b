//! # dslog
//!
//! Structured logging with two sinks: a colored console and an optional
//! rotating file that writes plain text or JSON lines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dslog::prelude::*;
//!
//! fn main() -> LogResult<()> {
//!     let logger = Logger::new("info", None, [LoggerOption::ServiceName("api".into())])?;
//!
//!     logger.info("started", &fields!("port" => 8080));
//!
//!     let req = logger.with_fields(fields!("request_id" => "r-42"));
//!     req.warn("slow upstream", &[]);
//!     Ok(())
//! }
//! ```
//!
//! Loggers are forked rather than mutated: [`Logger::with_fields`],
//! [`Logger::with_service`] and [`Logger::with_context`] return new loggers
//! sharing the configuration and the rotating file of their parent. The one
//! in-place change is [`Logger::set_level`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod compose;
pub mod config;
mod context;
pub mod core;
pub mod encoder;
mod field;
mod layer;
mod level;
mod logger;
mod macros;
pub mod rotation;
mod sink;
pub mod writer;

// Public API
pub use builder::{LoggerBuilder, LoggerOption};
pub use compose::{Composed, MessageComposer};
pub use config::{Config, EncoderConfig, LogFormat, TimeEncoding};
pub use context::{Context, ContextGuard};
pub use crate::core::{LogError, LogIoResultExt, LogResult};
pub use encoder::{Caller, ConsoleEncoder, Encode, JsonEncoder, Record};
pub use field::{Field, Value, format_fields};
pub use layer::DualSinkLayer;
pub use level::{LevelFormat, LevelFormats, ParseSeverityError, RESET, Severity};
pub use logger::Logger;
pub use rotation::{RotatingFile, RotationPolicy};
pub use sink::{Sink, SinkOption};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Config, Context, Field, LogError, LogFormat, LogResult, Logger, LoggerBuilder,
        LoggerOption, Severity, Value, debug, error, fields, info, warn,
    };
}
