//! Core dispatch types: records, sinks, loggers and the registry

pub mod error;
pub mod fallback;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod pattern;
pub mod record;
pub mod registry;
pub mod serialized;
pub mod sink;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use fallback::{
    silent_fallback, stderr_fallback, FallbackHandler, SinkFailure, SinkOperation,
};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::DeliveryMetrics;
pub use output_format::OutputFormat;
pub use pattern::PatternLayout;
pub use record::{Record, SourceLocation};
pub use registry::{LoggerConfig, Registry, RegistryBuilder, ROOT_LOGGER_NAME};
pub use serialized::{SerializedSink, DEFAULT_SHUTDOWN_TIMEOUT};
pub use sink::{Backend, DirectSink, Sink};
pub use timestamp::TimestampFormat;
