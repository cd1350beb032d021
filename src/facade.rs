//! Call-site facade: named handles with level methods

use crate::core::{LogLevel, Logger, Registry, Result, SourceLocation};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Lightweight handle to a named logger.
///
/// The handle keeps the [`Logger`] it last resolved and re-resolves only
/// when the registry generation moved, so a hot call site pays one atomic
/// load plus an uncontended lock on the fast path.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let registry = Registry::new();
/// let capture = MemorySink::new();
/// registry.configure_root(LogLevel::Info, vec![capture.shared()]).unwrap();
///
/// let log = registry.get_logger("app.startup");
/// log.info("listening");
/// log.debug_with(|| format!("{} routes", 12));
///
/// assert_eq!(capture.messages(), vec!["listening".to_string()]);
/// ```
pub struct LoggerHandle {
    registry: Registry,
    name: String,
    cached: Mutex<Option<(u64, Arc<Logger>)>>,
}

impl Registry {
    /// Facade entry point: a handle bound to `name` on this registry
    pub fn get_logger(&self, name: impl Into<String>) -> LoggerHandle {
        LoggerHandle {
            registry: self.clone(),
            name: name.into(),
            cached: Mutex::new(None),
        }
    }
}

impl LoggerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logger effective for this handle's name under the current configuration
    pub fn logger(&self) -> Arc<Logger> {
        // Read the generation before resolving; a concurrent swap then only
        // costs one extra resolve on the next call.
        let generation = self.registry.generation();
        let mut cached = self.cached.lock();
        if let Some((seen, logger)) = cached.as_ref() {
            if *seen == generation {
                return Arc::clone(logger);
            }
        }

        let logger = self.registry.resolve(&self.name);
        *cached = Some((generation, Arc::clone(&logger)));
        logger
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.logger().is_enabled(level)
    }

    /// Log a deferred message; `message` runs only if `level` passes
    #[inline]
    pub fn log<F>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> String,
    {
        self.logger().log(level, message);
    }

    /// Log a deferred message under an explicit category
    #[inline]
    pub fn log_in<F>(&self, level: LogLevel, category: &str, message: F)
    where
        F: FnOnce() -> String,
    {
        self.logger().log_in(level, category, message);
    }

    /// Log a deferred message with its call site attached
    #[inline]
    pub fn log_at<F>(&self, level: LogLevel, location: SourceLocation, message: F)
    where
        F: FnOnce() -> String,
    {
        self.logger().log_at(level, location, message);
    }

    #[inline]
    pub fn log_in_at<F>(&self, level: LogLevel, category: &str, location: SourceLocation, message: F)
    where
        F: FnOnce() -> String,
    {
        self.logger().log_in_at(level, category, location, message);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, || message.into());
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, || message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, || message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, || message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, || message.into());
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, || message.into());
    }

    pub fn trace_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal_with<F: FnOnce() -> String>(&self, message: F) {
        self.log(LogLevel::Fatal, message);
    }

    /// Flush the sinks this handle currently dispatches to
    pub fn flush(&self) -> Result<()> {
        self.logger().flush()
    }
}

impl Clone for LoggerHandle {
    fn clone(&self) -> Self {
        self.registry.get_logger(self.name.clone())
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("name", &self.name)
            .finish()
    }
}
