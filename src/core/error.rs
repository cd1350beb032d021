//! Error types for the logging facade

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Logger name rejected at configuration time
    #[error("Invalid logger name '{name}': {reason}")]
    InvalidLoggerName { name: String, reason: String },

    /// A configuration referenced a sink id nobody declared
    #[error("No such sink '{sink}' for logger '{logger}'")]
    UnknownSink { logger: String, sink: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Sink failed to accept or flush a record
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },

    /// Serialized sink already shut down
    #[error("Sink '{0}' already stopped")]
    SinkStopped(String),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid logger name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LoggerError::InvalidLoggerName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown sink reference error
    pub fn unknown_sink(logger: impl Into<String>, sink: impl Into<String>) -> Self {
        LoggerError::UnknownSink {
            logger: logger.into(),
            sink: sink.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink delivery error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors raised while validating configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLoggerName { .. }
                | LoggerError::UnknownSink { .. }
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::JsonError(_)
        )
    }
}
