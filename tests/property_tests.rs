//! Property-based tests for rust_log_facade using proptest

use proptest::prelude::*;
use rust_log_facade::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn logger_name() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Parsing is case-insensitive and round-trips through to_str
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), lower in any::<bool>()) {
        let text = if lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        let parsed: LogLevel = text.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows the numeric severity
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        prop_assert_eq!(level1 <= level2, (level1 as u8) <= (level2 as u8));
        prop_assert_eq!(level1 < level2, (level1 as u8) < (level2 as u8));
    }
}

// ============================================================================
// Filtering Tests
// ============================================================================

proptest! {
    /// The message closure runs exactly when the level passes
    #[test]
    fn test_thunk_runs_only_when_admissible(min in any_level(), level in any_level()) {
        let capture = MemorySink::new();
        let logger = Logger::new("prop", min, vec![capture.shared()]);
        let calls = AtomicUsize::new(0);

        logger.log(level, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "payload".to_string()
        });

        let expected = usize::from(level >= min);
        prop_assert_eq!(calls.load(Ordering::SeqCst), expected);
        prop_assert_eq!(capture.len(), expected);
    }
}

// ============================================================================
// Inheritance Tests
// ============================================================================

proptest! {
    /// A descendant of exactly one configured name inherits both fields from it
    #[test]
    fn test_descendant_inherits_from_ancestor(
        ancestor in logger_name(),
        suffix in prop::collection::vec(segment(), 0..4),
        level in any_level(),
    ) {
        let registry = Registry::new();
        let sink = MemorySink::new().shared();
        let ancestor_name = ancestor.join(".");
        registry
            .configure(&ancestor_name, Some(level), Some(vec![Arc::clone(&sink)]))
            .unwrap();

        let mut full = ancestor.clone();
        full.extend(suffix);
        let name = full.join(".");

        let logger = registry.resolve(&name);
        prop_assert_eq!(logger.min_level(), level);
        prop_assert_eq!(logger.sinks().len(), 1);
        prop_assert!(Arc::ptr_eq(&logger.sinks()[0], &sink));
        prop_assert_eq!(logger.level_source(), ancestor_name.as_str());

        // Stable until the next reconfiguration
        prop_assert!(Arc::ptr_eq(&logger, &registry.resolve(&name)));
    }

    /// The nearest of several configured ancestors wins for each field
    #[test]
    fn test_nearest_configured_ancestor_wins(
        name in prop::collection::vec(segment(), 2..6),
        levels in prop::collection::vec(any_level(), 6),
        configured in prop::collection::vec(any::<bool>(), 6),
    ) {
        let registry = Registry::new();
        let mut expected = LogLevel::Info;

        for depth in 1..=name.len() {
            if configured[depth - 1] {
                let prefix = name[..depth].join(".");
                registry.configure(&prefix, Some(levels[depth - 1]), None).unwrap();
                expected = levels[depth - 1];
            }
        }

        prop_assert_eq!(registry.resolve(&name.join(".")).min_level(), expected);
    }

    /// Names made of valid segments are always accepted
    #[test]
    fn test_valid_names_accepted(name in logger_name()) {
        let registry = Registry::new();
        prop_assert!(registry.configure(&name.join("."), Some(LogLevel::Debug), None).is_ok());
    }

    /// An empty segment anywhere is always rejected
    #[test]
    fn test_empty_segment_rejected(name in logger_name(), at in 0usize..5) {
        let mut segments = name;
        let at = at.min(segments.len());
        segments.insert(at, String::new());
        let registry = Registry::new();
        let result = registry.configure(&segments.join("."), Some(LogLevel::Debug), None);
        prop_assert!(result.is_err());
    }
}

// ============================================================================
// Output Tests
// ============================================================================

proptest! {
    /// No category or message can split a text or logfmt record across lines
    #[test]
    fn test_text_output_is_one_line(category in any::<String>(), message in any::<String>()) {
        let record = Record::new(LogLevel::Info, category, message);
        for format in [OutputFormat::Text, OutputFormat::Logfmt] {
            let line = format.format(&record, &TimestampFormat::Iso8601);
            prop_assert!(!line.contains('\n'));
            prop_assert!(!line.contains('\r'));
        }
    }

    /// Distinct messages never render to the same escaped text
    #[test]
    fn test_escaping_is_injective(a in "[a-z\\\\\n]{0,8}", b in "[a-z\\\\\n]{0,8}") {
        prop_assume!(a != b);
        let left = Record::new(LogLevel::Info, "x", a);
        let right = Record::new(LogLevel::Info, "x", b);
        prop_assert_ne!(left.escaped_message(), right.escaped_message());
    }
}
