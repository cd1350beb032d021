//! File backend

use crate::core::{Backend, LoggerError, OutputFormat, Record, Result, TimestampFormat};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one line per record to a file.
///
/// Writes are buffered; data reaches the file on `flush` and on drop.
pub struct FileBackend {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl FileBackend {
    /// Open `path` for appending, creating it if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            name: "file".to_string(),
            path,
            writer: Some(BufWriter::new(file)),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the timestamp format for this backend.
    ///
    /// An invalid `Custom` pattern renders as ISO 8601; check it first with
    /// [`TimestampFormat::validate`] to surface the mistake.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_log_facade::prelude::*;
    ///
    /// let backend = FileBackend::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn write(&mut self, record: &Record) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        let mut output = self.output_format.format(record, &self.timestamp_format);
        output.push('\n');

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        if let Err(e) = Backend::flush(self) {
            eprintln!(
                "[LOGGER ERROR] Failed to flush '{}' on drop: {}",
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::TempDir;

    #[test]
    fn test_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");

        let mut backend = FileBackend::new(&path).unwrap();
        backend.write(&Record::new(LogLevel::Info, "app", "first")).unwrap();
        backend
            .write(&Record::new(LogLevel::Warn, "app", "second\nline"))
            .unwrap();
        backend.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("app - first"));
        assert!(lines[1].ends_with("app - second\\nline"));
    }

    #[test]
    fn test_drop_flushes_buffer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drop.log");
        {
            let mut backend = FileBackend::new(&path)
                .unwrap()
                .with_output_format(OutputFormat::Json);
            backend.write(&Record::new(LogLevel::Error, "db", "lost?")).unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["message"], "lost?");
    }

    #[test]
    fn test_invalid_custom_timestamp_still_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ts.log");

        let mut backend = FileBackend::new(&path)
            .unwrap()
            .with_timestamp_format(TimestampFormat::Custom("%Q".to_string()));
        backend.write(&Record::new(LogLevel::Info, "app", "kept")).unwrap();
        backend.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with('['));
        assert!(content.trim_end().ends_with("app - kept"));
    }

    #[test]
    fn test_open_failure_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("app.log");
        let err = FileBackend::new(&path).err().unwrap();
        assert!(err.to_string().contains("app.log"));
    }
}
