//! Console backend

use crate::core::output_format::format_text;
use crate::core::{Backend, LogLevel, OutputFormat, Record, Result, TimestampFormat};
use colored::Colorize;
use std::io::Write;

/// Writes one line per record; Error and Fatal go to stderr, the rest to stdout
pub struct ConsoleBackend {
    name: String,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleBackend {
    pub fn new() -> Self {
        Self {
            name: "console".to_string(),
            use_colors: true,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the output format for this backend
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_facade::prelude::*;
    ///
    /// let console = DirectSink::new(ConsoleBackend::new().with_output_format(OutputFormat::Json));
    /// assert_eq!(console.name(), "console");
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Format as text; colors only apply to the level column
    fn render(&self, record: &Record) -> String {
        match &self.output_format {
            OutputFormat::Text if self.use_colors => {
                let level = format!("{:5}", record.level.to_str())
                    .color(record.level.color_code())
                    .to_string();
                format_text(record, &self.timestamp_format, &level)
            }
            format => format.format(record, &self.timestamp_format),
        }
    }
}

impl Default for ConsoleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ConsoleBackend {
    fn write(&mut self, record: &Record) -> Result<()> {
        let output = self.render(record);

        match record.level {
            LogLevel::Error | LogLevel::Fatal => {
                writeln!(std::io::stderr().lock(), "{}", output)?;
            }
            _ => {
                writeln!(std::io::stdout().lock(), "{}", output)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
