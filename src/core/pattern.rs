//! Pattern-based record layout
//!
//! A pattern is plain text with `%` markers, some of which take a parameter
//! in braces:
//!
//! | Marker | Output |
//! |---|---|
//! | `%d` | timestamp in the backend's [`TimestampFormat`]; `%d{<strftime>}` overrides it |
//! | `%l` | level name |
//! | `%n` | category |
//! | `%t` | thread name, or `thread-<id>` |
//! | `%m` | message |
//! | `%F` | source file |
//! | `%L` | source line |
//! | `%M` | module path |
//! | `%%` | a literal `%` |
//!
//! `%l`, `%n` and `%t` take an optional width: `%l{5}` pads on the right and
//! `%l{-5}` on the left. A parameter that is not a number is ignored. Unknown
//! markers are copied through unchanged. Source fields render as `-` on
//! records without a location. Free-form values are escaped the same way as
//! the text format.

use super::error::{LoggerError, Result};
use super::record::{escape_line, Record};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp(Option<TimestampFormat>),
    Level(Option<i32>),
    Category(Option<i32>),
    Thread(Option<i32>),
    Message,
    File,
    Line,
    Module,
}

/// A parsed layout pattern such as `"%d [%l{5}] %n - %m"`
///
/// # Examples
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let layout = PatternLayout::new("[%l] %n: %m").unwrap();
/// let record = Record::new(LogLevel::Warn, "db.pool", "exhausted");
/// assert_eq!(
///     layout.format(&record, &TimestampFormat::Iso8601),
///     "[WARN] db.pool: exhausted"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternLayout {
    /// Parse `pattern`; an unclosed `{` or an invalid `%d{..}` strftime
    /// string is a configuration error
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let segments = parse(&pattern)?;
        Ok(Self { pattern, segments })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render one record without the trailing newline
    pub fn format(&self, record: &Record, timestamp_format: &TimestampFormat) -> String {
        let mut out = String::with_capacity(self.pattern.len() + record.message.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Timestamp(custom) => {
                    let format = custom.as_ref().unwrap_or(timestamp_format);
                    out.push_str(&format.format(&record.timestamp));
                }
                Segment::Level(width) => pad(&mut out, record.level.to_str(), *width),
                Segment::Category(width) => pad(&mut out, &record.escaped_category(), *width),
                Segment::Thread(width) => {
                    pad(&mut out, &escape_line(&record.thread_label()), *width)
                }
                Segment::Message => out.push_str(&record.escaped_message()),
                Segment::File => match record.location {
                    Some(ref location) => out.push_str(&escape_line(&location.file)),
                    None => out.push_str(MISSING),
                },
                Segment::Line => match record.location {
                    Some(ref location) => out.push_str(&location.line.to_string()),
                    None => out.push_str(MISSING),
                },
                Segment::Module => match record.location {
                    Some(ref location) => out.push_str(&escape_line(&location.module)),
                    None => out.push_str(MISSING),
                },
            }
        }
        out
    }
}

/// Positive widths left-justify, negative widths right-justify
fn pad(out: &mut String, value: &str, width: Option<i32>) {
    match width {
        Some(width) if width >= 0 => {
            out.push_str(&format!("{:<width$}", value, width = width as usize))
        }
        Some(width) => out.push_str(&format!(
            "{:>width$}",
            value,
            width = width.unsigned_abs() as usize
        )),
        None => out.push_str(value),
    }
}

fn parse(pattern: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let marker = match chars.next() {
            Some(marker) => marker,
            None => {
                // A trailing '%' is kept as text
                literal.push('%');
                break;
            }
        };
        if marker == '%' {
            literal.push('%');
            continue;
        }

        let parameter = if chars.peek() == Some(&'{') {
            chars.next();
            let mut parameter = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => parameter.push(c),
                    None => {
                        return Err(LoggerError::config(
                            "pattern",
                            format!("unclosed '{{' after %{} in '{}'", marker, pattern),
                        ))
                    }
                }
            }
            Some(parameter)
        } else {
            None
        };

        let segment = match marker {
            'd' => match parameter {
                Some(format_str) => {
                    let custom = TimestampFormat::Custom(format_str);
                    custom.validate()?;
                    Segment::Timestamp(Some(custom))
                }
                None => Segment::Timestamp(None),
            },
            'l' => Segment::Level(width(parameter.as_deref())),
            'n' => Segment::Category(width(parameter.as_deref())),
            't' => Segment::Thread(width(parameter.as_deref())),
            'm' => Segment::Message,
            'F' => Segment::File,
            'L' => Segment::Line,
            'M' => Segment::Module,
            unknown => {
                literal.push('%');
                literal.push(unknown);
                if let Some(parameter) = parameter {
                    literal.push('{');
                    literal.push_str(&parameter);
                    literal.push('}');
                }
                continue;
            }
        };

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(segment);
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn width(parameter: Option<&str>) -> Option<i32> {
    parameter.and_then(|p| p.trim().parse().ok())
}

impl FromStr for PatternLayout {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PatternLayout {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PatternLayout> for String {
    fn from(layout: PatternLayout) -> Self {
        layout.pattern
    }
}

impl fmt::Display for PatternLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
