//! # Rust Log Facade
//!
//! A hierarchical logging facade: named loggers inherit their level and
//! sinks from the nearest configured ancestor, messages are built only when
//! their level passes, and sinks can own their backend on a dedicated worker
//! thread.
//!
//! ## Features
//!
//! - **Hierarchical names**: `app.net.http` inherits from `app.net`, then `app`, then the root
//! - **Lazy messages**: closures run strictly after the level check
//! - **Serialized sinks**: non-thread-safe backends get one worker and a FIFO queue
//! - **Isolated failures**: a failing sink never reaches the call site
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::debug;
//!
//! let registry = Registry::new();
//! let capture = MemorySink::new();
//!
//! registry.configure_root(LogLevel::Warn, Vec::new()).unwrap();
//! registry
//!     .configure("app.net", Some(LogLevel::Debug), Some(vec![capture.shared()]))
//!     .unwrap();
//!
//! let http = registry.get_logger("app.net.http");
//! debug!(http, "GET {} -> {}", "/health", 200);
//! registry.get_logger("app.other").debug("filtered");
//!
//! assert_eq!(capture.messages(), vec!["GET /health -> 200".to_string()]);
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{RegistryConfig, SinkCatalog};
    pub use crate::core::{
        Backend, DeliveryMetrics, DirectSink, FallbackHandler, LogLevel, Logger, LoggerConfig,
        LoggerError, OutputFormat, PatternLayout, Record, Registry, Result, SerializedSink, Sink,
        SinkFailure, SourceLocation, TimestampFormat,
    };
    pub use crate::facade::LoggerHandle;
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleBackend;
    #[cfg(feature = "file")]
    pub use crate::sinks::FileBackend;
    pub use crate::sinks::{MemoryBackend, MemorySink};
}

pub use crate::config::{
    LoggerDefinition, RegistryConfig, RootDefinition, SinkCatalog, SinkDefinition, SinkKind,
};
pub use crate::core::{
    silent_fallback, stderr_fallback, Backend, DeliveryMetrics, DirectSink, FallbackHandler,
    LogLevel, Logger, LoggerConfig, LoggerError, OutputFormat, PatternLayout, Record, Registry,
    RegistryBuilder, Result, SerializedSink, Sink, SinkFailure, SinkOperation, SourceLocation,
    TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT, ROOT_LOGGER_NAME,
};
pub use crate::facade::LoggerHandle;
#[cfg(feature = "console")]
pub use crate::sinks::ConsoleBackend;
#[cfg(feature = "file")]
pub use crate::sinks::FileBackend;
pub use crate::sinks::{MemoryBackend, MemorySink};
