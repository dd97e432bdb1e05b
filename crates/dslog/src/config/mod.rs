//! Configuration types, defaults and merging
//!
//! A [`Config`] is usually built partially by the caller and completed with
//! [`merge`], which fills every unset field from [`Config::defaults`].

mod base;
mod encoder;
mod merge;
mod presets;

pub use base::{Config, LogFormat};
pub use encoder::{EncoderConfig, LevelEncoder, TimeEncoding};
pub use merge::merge;
