//! Sink and backend traits for log output destinations

use super::{error::Result, record::Record};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared output capability attached to loggers.
///
/// Sinks receive only records that already passed the logger's level check
/// and must not filter again. One sink instance may be attached to many
/// loggers and called from many threads at once.
pub trait Sink: Send + Sync {
    fn accept(&self, record: &Arc<Record>) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Raw writer behind a sink.
///
/// A backend needs `&mut self` and only `Send`: it may wrap a resource that
/// is unsafe to use from two threads. Wrap it in a [`DirectSink`] to write on
/// the caller's thread, or in a
/// [`SerializedSink`](super::serialized::SerializedSink) to give it a thread
/// of its own.
pub trait Backend: Send {
    fn write(&mut self, record: &Record) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn write(&mut self, record: &Record) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Sink that writes on the calling thread.
///
/// Concurrent callers are serialized by a mutex, so the calling thread blocks
/// for the duration of the write.
pub struct DirectSink<B: Backend> {
    name: String,
    backend: Mutex<B>,
}

impl<B: Backend> DirectSink<B> {
    pub fn new(backend: B) -> Self {
        Self {
            name: backend.name().to_string(),
            backend: Mutex::new(backend),
        }
    }

    /// Override the name reported in diagnostics
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Wrap into the shared form loggers hold
    pub fn shared(self) -> Arc<dyn Sink>
    where
        B: 'static,
    {
        Arc::new(self)
    }
}

impl<B: Backend> Sink for DirectSink<B> {
    fn accept(&self, record: &Arc<Record>) -> Result<()> {
        self.backend.lock().write(record)
    }

    fn flush(&self) -> Result<()> {
        self.backend.lock().flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
