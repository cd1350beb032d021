//! In-memory capture sink

use crate::core::{Backend, Record, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct Store {
    records: Vec<Arc<Record>>,
    flushes: usize,
}

/// Sink keeping every accepted record in memory.
///
/// Clones share the same store, so a test can keep one handle for
/// inspection while another is attached to a logger.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let capture = MemorySink::new();
/// let logger = Logger::new("app", LogLevel::Info, vec![capture.shared()]);
///
/// logger.log(LogLevel::Warn, || "disk at 91%".to_string());
/// assert_eq!(capture.messages(), vec!["disk at 91%".to_string()]);
/// ```
#[derive(Clone)]
pub struct MemorySink {
    name: String,
    store: Arc<Mutex<Store>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_name("memory")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    /// Another handle on the same store, in the shared form loggers hold
    pub fn shared(&self) -> Arc<dyn Sink> {
        Arc::new(self.clone())
    }

    /// Backend view on the same store, for wrapping in a serialized sink
    pub fn backend(&self) -> MemoryBackend {
        MemoryBackend {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
        }
    }

    /// Copies of the captured records, oldest first
    pub fn records(&self) -> Vec<Record> {
        self.store
            .lock()
            .records
            .iter()
            .map(|record| Record::clone(record))
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.store
            .lock()
            .records
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of flush calls seen through any handle
    pub fn flush_count(&self) -> usize {
        self.store.lock().flushes
    }

    pub fn clear(&self) {
        let mut store = self.store.lock();
        store.records.clear();
        store.flushes = 0;
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn accept(&self, record: &Arc<Record>) -> Result<()> {
        self.store.lock().records.push(Arc::clone(record));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.store.lock().flushes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// [`Backend`] half of a [`MemorySink`]
pub struct MemoryBackend {
    name: String,
    store: Arc<Mutex<Store>>,
}

impl Backend for MemoryBackend {
    fn write(&mut self, record: &Record) -> Result<()> {
        self.store.lock().records.push(Arc::new(record.clone()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.store.lock().flushes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
