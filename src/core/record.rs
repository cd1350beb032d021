//! Immutable log record

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Numeric identifier of the calling thread, stable for the thread's lifetime
pub fn current_thread_id() -> u64 {
    THREAD_ID_CACHE.with(|id| *id)
}

/// Get cached thread name, computing and caching it on first access
fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        cache
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Escape a value so it stays on one line and reads back unambiguously.
///
/// Backslashes are doubled, `\n`, `\r` and `\t` become their two-character
/// escapes, and other control characters become `\u{..}`.
pub fn escape_line(value: &str) -> Cow<'_, str> {
    if !value.chars().any(|c| c == '\\' || c.is_control()) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{{{:04x}}}", c as u32)),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Call site of a log statement, captured by the logging macros
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub module: Cow<'static, str>,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32, module: &'static str) -> Self {
        Self {
            file: Cow::Borrowed(file),
            line,
            module: Cow::Borrowed(module),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One logged event.
///
/// Built by a [`Logger`](super::Logger) only after the level check passed and
/// shared read-only, behind an `Arc`, with every sink of that dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub category: String,
    pub thread_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Record {
    /// Capture a record on the calling thread
    pub fn new(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            category: category.into(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
            message: message.into(),
            location: None,
        }
    }

    /// Attach the call site that emitted this record
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Thread name if set, otherwise the numeric id
    pub fn thread_label(&self) -> String {
        match self.thread_name {
            Some(ref name) => name.clone(),
            None => format!("thread-{}", self.thread_id),
        }
    }

    /// Message passed through [`escape_line`]
    pub fn escaped_message(&self) -> Cow<'_, str> {
        escape_line(&self.message)
    }

    pub fn escaped_category(&self) -> Cow<'_, str> {
        escape_line(&self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_captures_thread() {
        let record = Record::new(LogLevel::Info, "app", "hello");
        assert_eq!(record.thread_id, current_thread_id());
        assert_eq!(record.category, "app");
        assert_eq!(record.message, "hello");
    }

    #[test]
    fn test_thread_ids_differ_across_threads() {
        let here = current_thread_id();
        let there = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, current_thread_id());
    }

    #[test]
    fn test_thread_label_prefers_name() {
        let label = std::thread::Builder::new()
            .name("worker-7".into())
            .spawn(|| Record::new(LogLevel::Debug, "x", "y").thread_label())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(label, "worker-7");
    }

    #[test]
    fn test_escaped_message() {
        let record = Record::new(LogLevel::Warn, "x", "a\nb\tc\r");
        assert_eq!(record.escaped_message(), "a\\nb\\tc\\r");
        assert_eq!(record.message, "a\nb\tc\r");
    }

    #[test]
    fn test_escape_line_is_unambiguous() {
        assert_eq!(escape_line("plain"), "plain");
        assert!(matches!(escape_line("plain"), Cow::Borrowed(_)));
        // A literal backslash-n and a real newline must not render the same
        assert_eq!(escape_line("a\\nb"), "a\\\\nb");
        assert_eq!(escape_line("a\nb"), "a\\nb");
        assert_eq!(escape_line("bell\u{7}"), "bell\\u{0007}");
    }

    #[test]
    fn test_escaped_category() {
        let record = Record::new(LogLevel::Info, "auth\n[FATAL] forged", "ok");
        assert_eq!(record.escaped_category(), "auth\\n[FATAL] forged");
    }

    #[test]
    fn test_location_is_optional_in_serde() {
        let record = Record::new(LogLevel::Info, "app", "plain");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("location"));

        let located = record.with_location(SourceLocation::new("src/main.rs", 12, "app::main"));
        let json = serde_json::to_string(&located).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.location, located.location);
        assert_eq!(located.location.unwrap().to_string(), "src/main.rs:12");
    }
}
