//! Overlay a partial configuration onto the defaults

use std::path::PathBuf;

use super::{Config, EncoderConfig};

/// Zero-value test used to decide whether a field was set
trait Unset {
    fn is_unset(&self) -> bool;
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for PathBuf {
    fn is_unset(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl Unset for u64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for usize {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

// An empty level table is a deliberate setting; only an absent one is unset.
impl<T> Unset for Option<T> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

impl Unset for EncoderConfig {
    fn is_unset(&self) -> bool {
        EncoderConfig::is_unset(self)
    }
}

// A single empty decorator is a partial override and is kept.
impl Unset for [String; 2] {
    fn is_unset(&self) -> bool {
        self.iter().all(String::is_empty)
    }
}

macro_rules! overlay {
    ($user:ident, $defaults:ident; $($field:ident),+ $(,)?) => {
        $(
            if Unset::is_unset(&$user.$field) {
                $user.$field = $defaults.$field;
            }
        )+
    };
}

/// Fill every unset field of `user` from [`Config::defaults`], then
/// resynchronize separators and level encoders.
pub fn merge(user: Config) -> Config {
    let defaults = Config::raw_defaults();
    let mut merged = user;

    overlay!(merged, defaults;
        log_file,
        log_file_format,
        max_size,
        max_backups,
        max_age,
        compress,
        level,
        console,
        file,
        console_separator,
        field_separator,
        service_name_decorators,
        level_formats,
    );

    merged.sync();
    merged
}
