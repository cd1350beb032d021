//! Output format configuration for records
//!
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools
//! - Pattern: User-defined layout, see [`PatternLayout`]

use super::pattern::PatternLayout;
use super::record::{escape_line, Record};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Output format for records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] [main] app.net - Request processed`
    #[default]
    Text,

    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","category":"app.net",...}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO category=app.net message="Request processed"`
    Logfmt,

    /// Example: `{"pattern": "%d [%l{5}] %n - %m"}` in a configuration document
    Pattern(PatternLayout),
}

impl OutputFormat {
    /// Render one record as a single line without the trailing newline
    pub fn format(&self, record: &Record, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => format_text(record, timestamp_format, record.level.to_str()),
            OutputFormat::Json => format_json(record, timestamp_format),
            OutputFormat::Logfmt => format_logfmt(record, timestamp_format),
            OutputFormat::Pattern(layout) => layout.format(record, timestamp_format),
        }
    }
}

/// Text layout; `level` is passed in so callers can colorize it.
///
/// Every free-form field is escaped, so one record is always one line.
pub(crate) fn format_text(
    record: &Record,
    timestamp_format: &TimestampFormat,
    level: &str,
) -> String {
    let location = match record.location {
        Some(ref location) => format!(" ({})", escape_line(&location.to_string())),
        None => String::new(),
    };
    format!(
        "[{}] [{:5}] [{}] {}{} - {}",
        timestamp_format.format(&record.timestamp),
        level,
        escape_line(&record.thread_label()),
        record.escaped_category(),
        location,
        record.escaped_message()
    )
}

fn format_json(record: &Record, timestamp_format: &TimestampFormat) -> String {
    let mut json_obj = serde_json::Map::new();

    let timestamp = if timestamp_format.is_numeric() {
        serde_json::Value::Number(record.timestamp.timestamp_millis().into())
    } else {
        serde_json::Value::String(timestamp_format.format(&record.timestamp))
    };
    json_obj.insert("timestamp".to_string(), timestamp);
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(record.level.to_str().to_string()),
    );
    json_obj.insert(
        "category".to_string(),
        serde_json::Value::String(record.category.clone()),
    );
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(record.message.clone()),
    );
    json_obj.insert(
        "thread_id".to_string(),
        serde_json::Value::Number(record.thread_id.into()),
    );
    if let Some(ref name) = record.thread_name {
        json_obj.insert(
            "thread_name".to_string(),
            serde_json::Value::String(name.clone()),
        );
    }
    if let Some(ref location) = record.location {
        json_obj.insert(
            "file".to_string(),
            serde_json::Value::String(location.file.to_string()),
        );
        json_obj.insert("line".to_string(), serde_json::Value::Number(location.line.into()));
        json_obj.insert(
            "module".to_string(),
            serde_json::Value::String(location.module.to_string()),
        );
    }

    serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

fn format_logfmt(record: &Record, timestamp_format: &TimestampFormat) -> String {
    let mut parts = vec![
        format!(
            "timestamp={}",
            escape_logfmt_value(&timestamp_format.format(&record.timestamp))
        ),
        format!("level={}", record.level.to_str()),
        format!("category={}", escape_logfmt_value(&record.category)),
        // Always quoted
        format!("message={}", quote_logfmt_value(&record.message)),
        format!("thread_id={}", record.thread_id),
    ];
    if let Some(ref name) = record.thread_name {
        parts.push(format!("thread_name={}", escape_logfmt_value(name)));
    }
    if let Some(ref location) = record.location {
        parts.push(format!("file={}", escape_logfmt_value(&location.file)));
        parts.push(format!("line={}", location.line));
        parts.push(format!("module={}", escape_logfmt_value(&location.module)));
    }
    parts.join(" ")
}

/// Quote a logfmt value if it contains spaces or special chars
fn escape_logfmt_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ' ' | '"' | '=' | '\\') || c.is_control());
    if needs_quotes {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", escape_line(value).replace('"', "\\\""))
}
