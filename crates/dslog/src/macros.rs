//! Convenience macros for structured logging

/// Build a `Vec<Field>` from `key => value` pairs
///
/// ```rust
/// let fields = dslog::fields!("port" => 8080, "tls" => true);
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let fields: ::std::vec::Vec<$crate::Field> =
            ::std::vec![$($crate::Field::new($key, $value)),*];
        fields
    }};
}

/// Log through a [`Logger`](crate::Logger) at an explicit severity
///
/// ```rust,no_run
/// use dslog::{Logger, Severity};
///
/// let logger = Logger::simple_console("debug")?;
/// dslog::log!(logger, Severity::Warn, "slow request", "elapsed_ms" => 1200);
/// # Ok::<(), dslog::LogError>(())
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.log($severity, $msg, &[$($crate::Field::new($key, $value)),*])
    };
}

/// Log at debug level
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($rest)+)
    };
}

/// Log at info level
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($rest)+)
    };
}

/// Log at warn level
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($rest)+)
    };
}

/// Log at error level
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($rest)+)
    };
}
