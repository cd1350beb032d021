//! Resolved logger: level filter plus ordered sink fan-out

use super::{
    error::Result,
    fallback::{isolate, stderr_fallback, FallbackHandler, SinkOperation},
    log_level::LogLevel,
    metrics::DeliveryMetrics,
    record::{Record, SourceLocation},
    sink::Sink,
};
use std::fmt;
use std::sync::Arc;

/// A named filtering and fan-out unit.
///
/// Loggers handed out by a [`Registry`](super::Registry) are immutable
/// snapshots of the effective configuration for one name: the level and the
/// sinks were already inherited from the nearest configured ancestor.
/// Reconfiguring the registry produces new loggers, it never mutates one.
pub struct Logger {
    name: String,
    min_level: LogLevel,
    sinks: Arc<[Arc<dyn Sink>]>,
    level_source: String,
    sinks_source: String,
    metrics: Arc<DeliveryMetrics>,
    fallback: FallbackHandler,
}

impl Logger {
    /// Standalone logger, not attached to any registry
    #[must_use]
    pub fn new(name: impl Into<String>, min_level: LogLevel, sinks: Vec<Arc<dyn Sink>>) -> Self {
        let name = name.into();
        Self {
            level_source: name.clone(),
            sinks_source: name.clone(),
            name,
            min_level,
            sinks: sinks.into(),
            metrics: Arc::new(DeliveryMetrics::new()),
            fallback: stderr_fallback(),
        }
    }

    pub(crate) fn resolved(
        name: String,
        (min_level, level_source): (LogLevel, String),
        (sinks, sinks_source): (Arc<[Arc<dyn Sink>]>, String),
        metrics: Arc<DeliveryMetrics>,
        fallback: FallbackHandler,
    ) -> Self {
        Self {
            name,
            min_level,
            sinks,
            level_source,
            sinks_source,
            metrics,
            fallback,
        }
    }

    /// Replace the fallback handler used for sink failures
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackHandler) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective minimum level after inheritance
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Effective sinks after inheritance, in dispatch order
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Configured name the level was inherited from (`root` for the root default)
    pub fn level_source(&self) -> &str {
        &self.level_source
    }

    /// Configured name the sinks were inherited from (`root` for the root default)
    pub fn sinks_source(&self) -> &str {
        &self.sinks_source
    }

    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }

    /// Whether a message at `level` would be turned into a record
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Log a deferred message under this logger's own name as category.
    ///
    /// `message` runs only if `level` passes the filter.
    #[inline]
    pub fn log<F>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> String,
    {
        self.emit(level, None, None, message);
    }

    /// Log a deferred message under an explicit category
    #[inline]
    pub fn log_in<F>(&self, level: LogLevel, category: &str, message: F)
    where
        F: FnOnce() -> String,
    {
        self.emit(level, Some(category), None, message);
    }

    /// Like [`log`](Self::log), recording the call site; the macros use this
    #[inline]
    pub fn log_at<F>(&self, level: LogLevel, location: SourceLocation, message: F)
    where
        F: FnOnce() -> String,
    {
        self.emit(level, None, Some(location), message);
    }

    /// Like [`log_in`](Self::log_in), recording the call site
    #[inline]
    pub fn log_in_at<F>(&self, level: LogLevel, category: &str, location: SourceLocation, message: F)
    where
        F: FnOnce() -> String,
    {
        self.emit(level, Some(category), Some(location), message);
    }

    #[inline]
    fn emit<F>(
        &self,
        level: LogLevel,
        category: Option<&str>,
        location: Option<SourceLocation>,
        message: F,
    ) where
        F: FnOnce() -> String,
    {
        if !self.is_enabled(level) {
            return;
        }
        let mut record = Record::new(level, category.unwrap_or(self.name.as_str()), message());
        record.location = location;
        self.dispatch(record);
    }

    /// Hand an admissible record to every sink in insertion order.
    ///
    /// Each sink is isolated: an error or panic in one is reported to the
    /// fallback handler and the remaining sinks still get the record.
    fn dispatch(&self, record: Record) {
        if self.sinks.is_empty() {
            return;
        }

        let record = Arc::new(record);
        for sink in self.sinks.iter() {
            isolate(
                sink.name(),
                SinkOperation::Accept,
                &self.metrics,
                &self.fallback,
                || sink.accept(&record),
            );
        }
    }

    /// Flush every sink; all sinks are flushed even if one fails, and the
    /// first error is returned.
    pub fn flush(&self) -> Result<()> {
        flush_all(self.sinks.iter())
    }
}

/// Flush a set of sinks, returning the first error after trying all of them
pub(crate) fn flush_all<'a, I>(sinks: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Arc<dyn Sink>>,
{
    let mut first_error = None;
    for sink in sinks {
        if let Err(e) = sink.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush sink '{}': {}", sink.name(), e);
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("level_source", &self.level_source)
            .field("sinks_source", &self.sinks_source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoggerError;
    use crate::core::fallback::{silent_fallback, SinkFailure};
    use crate::sinks::MemorySink;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink;

    impl Sink for FailingSink {
        fn accept(&self, _record: &Arc<Record>) -> Result<()> {
            Err(LoggerError::other("Simulated failure"))
        }

        fn flush(&self) -> Result<()> {
            Err(LoggerError::other("Simulated flush failure"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_filtered_message_is_never_evaluated() {
        let memory = MemorySink::new();
        let logger = Logger::new("app", LogLevel::Warn, vec![memory.shared()]);
        let calls = AtomicUsize::new(0);

        logger.log(LogLevel::Debug, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "hidden".to_string()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(memory.is_empty());

        logger.log(LogLevel::Error, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "shown".to_string()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memory.messages(), vec!["shown".to_string()]);
    }

    #[test]
    fn test_record_fields() {
        let memory = MemorySink::new();
        let logger = Logger::new("app.db", LogLevel::Trace, vec![memory.shared()]);

        logger.log(LogLevel::Info, || "default category".to_string());
        logger.log_in(LogLevel::Warn, "pool", || "explicit category".to_string());

        let records = memory.records();
        assert_eq!(records[0].category, "app.db");
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[1].category, "pool");
        assert_eq!(records[1].level, LogLevel::Warn);
        assert_eq!(records[1].thread_id, crate::core::record::current_thread_id());
    }

    #[test]
    fn test_location_is_attached_when_given() {
        let memory = MemorySink::new();
        let logger = Logger::new("app", LogLevel::Info, vec![memory.shared()]);
        let here = SourceLocation::new("src/app.rs", 3, "app");

        logger.log(LogLevel::Info, || "bare".to_string());
        logger.log_at(LogLevel::Info, here.clone(), || "located".to_string());
        logger.log_in_at(LogLevel::Warn, "audit", here.clone(), || "both".to_string());
        logger.log_at(LogLevel::Debug, here.clone(), || "filtered".to_string());

        let records = memory.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].location, None);
        assert_eq!(records[1].location.as_ref(), Some(&here));
        assert_eq!(records[1].category, "app");
        assert_eq!(records[2].category, "audit");
        assert_eq!(records[2].location.as_ref(), Some(&here));
    }

    #[test]
    fn test_sinks_receive_in_insertion_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        struct OrderSink(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl Sink for OrderSink {
            fn accept(&self, _record: &Arc<Record>) -> Result<()> {
                self.1.lock().push(self.0);
                Ok(())
            }
            fn flush(&self) -> Result<()> {
                Ok(())
            }
            fn name(&self) -> &str {
                self.0
            }
        }

        let sinks: Vec<Arc<dyn Sink>> = vec![
            Arc::new(OrderSink("first", Arc::clone(&order))),
            Arc::new(OrderSink("second", Arc::clone(&order))),
            Arc::new(OrderSink("third", Arc::clone(&order))),
        ];
        let logger = Logger::new("app", LogLevel::Info, sinks);
        logger.log(LogLevel::Info, || "x".to_string());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_sink_is_isolated() {
        let memory = MemorySink::new();
        let failures = Arc::new(Mutex::new(Vec::<SinkFailure>::new()));
        let failures_clone = Arc::clone(&failures);

        let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(FailingSink), memory.shared()];
        let logger = Logger::new("app", LogLevel::Info, sinks).with_fallback(Arc::new(
            move |f: &SinkFailure| failures_clone.lock().push(f.clone()),
        ));

        for i in 0..5 {
            logger.log(LogLevel::Info, || format!("message {}", i));
        }

        assert_eq!(memory.len(), 5);
        assert_eq!(failures.lock().len(), 5);
        assert_eq!(logger.metrics().failed(), 5);
        assert_eq!(logger.metrics().delivered(), 5);
    }

    #[test]
    fn test_zero_sinks_is_silent() {
        let logger =
            Logger::new("quiet", LogLevel::Trace, Vec::new()).with_fallback(silent_fallback());
        let calls = AtomicUsize::new(0);
        logger.log(LogLevel::Fatal, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "nobody listens".to_string()
        });
        // Admissible messages are still evaluated
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(logger.flush().is_ok());
    }

    #[test]
    fn test_flush_reports_first_error_and_flushes_rest() {
        let memory = MemorySink::new();
        let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(FailingSink), memory.shared()];
        let logger = Logger::new("app", LogLevel::Info, sinks).with_fallback(silent_fallback());
        assert!(logger.flush().is_err());
        assert_eq!(memory.flush_count(), 1);
    }
}
