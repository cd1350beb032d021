//! Logging macros for ergonomic log message formatting.
//!
//! The macros work with a [`Logger`](crate::Logger) or a
//! [`LoggerHandle`](crate::LoggerHandle). Formatting happens inside a
//! closure, so arguments are never formatted for a filtered level. Every
//! macro records its call site (file, line and module path) on the record.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{info, warn};
//!
//! let registry = Registry::new();
//! let capture = MemorySink::new();
//! registry.configure_root(LogLevel::Info, vec![capture.shared()]).unwrap();
//! let log = registry.get_logger("server");
//!
//! let port = 8080;
//! info!(log, "Server listening on port {}", port);
//! warn!(log, category: "server.tls", "certificate expires in {} days", 9);
//!
//! let records = capture.records();
//! assert_eq!(records[0].message, "Server listening on port 8080");
//! assert_eq!(records[1].category, "server.tls");
//! ```

/// Log a message with lazy formatting.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new("app", LogLevel::Info, Vec::new());
/// use rust_log_facade::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Error, category: "http", "Error code: {}", 503);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, category: $category:expr, $($arg:tt)+) => {
        $logger.log_in_at(
            $level,
            &$category,
            $crate::source_location!(),
            || format!($($arg)+),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, $crate::source_location!(), || format!($($arg)+))
    };
}

/// [`SourceLocation`](crate::SourceLocation) of the invocation site.
///
/// ```
/// let here = rust_log_facade::source_location!();
/// assert!(!here.file.is_empty());
/// assert!(here.line > 0);
/// ```
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(file!(), line!(), module_path!())
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, category: $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, category: $category, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger};
    use crate::sinks::MemorySink;
    use std::cell::Cell;

    fn capture(level: LogLevel) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::new("macros", level, vec![sink.shared()]), sink)
    }

    #[test]
    fn test_log_macro() {
        let (logger, sink) = capture(LogLevel::Info);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        assert_eq!(sink.messages(), vec!["Test message", "Formatted: 42"]);
    }

    #[test]
    fn test_level_macros() {
        let (logger, sink) = capture(LogLevel::Trace);
        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        fatal!(logger, "Critical failure: {}", "system");

        let levels: Vec<LogLevel> = sink.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }

    #[test]
    fn test_category_prefix() {
        let (logger, sink) = capture(LogLevel::Info);
        let category = String::from("billing");
        info!(logger, category: "audit", "user {} logged in", 7);
        error!(logger, category: category, "charge failed");

        let records = sink.records();
        assert_eq!(records[0].category, "audit");
        assert_eq!(records[0].message, "user 7 logged in");
        assert_eq!(records[1].category, "billing");
    }

    #[test]
    fn test_macros_capture_call_site() {
        let (logger, sink) = capture(LogLevel::Info);
        let line = line!() + 1;
        info!(logger, "here");
        warn!(logger, category: "audit", "there");

        let records = sink.records();
        let location = records[0].location.as_ref().expect("location captured");
        assert_eq!(location.file, file!());
        assert_eq!(location.line, line);
        assert_eq!(location.module, module_path!());
        assert_eq!(records[1].location.as_ref().map(|l| l.line), Some(line + 1));
        assert_eq!(records[1].category, "audit");
    }

    #[test]
    fn test_arguments_not_formatted_when_filtered() {
        struct Loud<'a>(&'a Cell<usize>);
        impl std::fmt::Display for Loud<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.set(self.0.get() + 1);
                write!(f, "loud")
            }
        }

        let (logger, sink) = capture(LogLevel::Error);
        let formatted = Cell::new(0);
        debug!(logger, "{}", Loud(&formatted));
        assert_eq!(formatted.get(), 0);
        error!(logger, "{}", Loud(&formatted));
        assert_eq!(formatted.get(), 1);
        assert_eq!(sink.len(), 1);
    }
}
