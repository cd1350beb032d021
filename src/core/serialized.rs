//! Serialized sink: one queue, one worker, exclusive backend ownership

use super::{
    error::{LoggerError, Result},
    fallback::{isolate, stderr_fallback, FallbackHandler, SinkOperation},
    metrics::DeliveryMetrics,
    record::Record,
    sink::{Backend, Sink},
};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for serialized sink cleanup (5 seconds)
///
/// This timeout is used when the sink is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Write(Arc<Record>),
    Flush(Sender<()>),
}

/// Sink that moves its backend onto a dedicated worker thread.
///
/// `accept` pushes the record on an unbounded FIFO queue and returns at once.
/// The worker is the only thread that ever touches the backend, so the
/// backend itself needs no synchronization. Records from one calling thread
/// reach the backend in the order they were logged; records from different
/// threads reach it in queue-arrival order.
///
/// Backend failures happen on the worker, after `accept` returned, and are
/// reported to the fallback handler.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
/// use std::sync::Arc;
///
/// let memory = MemorySink::new();
/// let sink = SerializedSink::new(memory.backend()).unwrap();
///
/// let record = Arc::new(Record::new(LogLevel::Info, "app", "queued"));
/// sink.accept(&record).unwrap();
/// sink.flush().unwrap();
///
/// assert_eq!(memory.messages(), vec!["queued".to_string()]);
/// ```
pub struct SerializedSink {
    name: String,
    sender: RwLock<Option<Sender<Command>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<DeliveryMetrics>,
}

impl SerializedSink {
    /// Spawn the worker and hand it `backend`; failures go to stderr
    pub fn new<B: Backend + 'static>(backend: B) -> Result<Self> {
        Self::with_fallback(backend, stderr_fallback())
    }

    /// Spawn the worker with a custom fallback handler
    pub fn with_fallback<B: Backend + 'static>(
        backend: B,
        fallback: FallbackHandler,
    ) -> Result<Self> {
        let name = backend.name().to_string();
        let (sender, receiver) = unbounded();
        let metrics = Arc::new(DeliveryMetrics::new());
        let metrics_clone = Arc::clone(&metrics);
        let worker_name = name.clone();

        let handle = thread::Builder::new()
            .name(format!("log-sink-{}", name))
            .spawn(move || Self::run(backend, receiver, &worker_name, &metrics_clone, &fallback))
            .map_err(|e| LoggerError::io_operation("spawning sink worker", name.clone(), e))?;

        Ok(Self {
            name,
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            metrics,
        })
    }

    /// Wrap into the shared form loggers hold
    pub fn shared(self) -> Arc<dyn Sink> {
        Arc::new(self)
    }

    /// Worker loop: drain commands in FIFO order until every sender is gone
    fn run<B: Backend>(
        mut backend: B,
        receiver: Receiver<Command>,
        name: &str,
        metrics: &DeliveryMetrics,
        fallback: &FallbackHandler,
    ) {
        for command in receiver.iter() {
            match command {
                Command::Write(record) => {
                    isolate(name, SinkOperation::Accept, metrics, fallback, || {
                        backend.write(&record)
                    });
                }
                Command::Flush(ack) => {
                    isolate(name, SinkOperation::Flush, metrics, fallback, || backend.flush());
                    // The flusher may have given up waiting; nothing to do then.
                    let _ = ack.send(());
                }
            }
        }

        isolate(name, SinkOperation::Flush, metrics, fallback, || backend.flush());
    }

    /// Records queued but not yet taken by the worker
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, |sender| sender.len())
    }

    /// True until `shutdown` has been called
    pub fn is_running(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Delivery counters for this sink's backend
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }

    /// Close the queue, let the worker drain it and join the worker.
    ///
    /// Returns `true` if the worker finished within `timeout`. Records
    /// accepted before the call are written; later `accept` calls fail with
    /// [`LoggerError::SinkStopped`].
    pub fn shutdown(&self, timeout: Duration) -> bool {
        // Close the channel to signal the worker thread
        drop(self.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Worker for sink '{}' panicked during shutdown: {:?}",
                        self.name, e
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Worker for sink '{}' did not finish within {:?}. \
                     {} queued records may be lost.",
                    self.name,
                    timeout,
                    self.metrics.enqueued().saturating_sub(
                        self.metrics.delivered() + self.metrics.total_failures()
                    )
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn stopped(&self) -> LoggerError {
        LoggerError::SinkStopped(self.name.clone())
    }
}

impl Sink for SerializedSink {
    fn accept(&self, record: &Arc<Record>) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or_else(|| self.stopped())?;
        sender
            .send(Command::Write(Arc::clone(record)))
            .map_err(|_| self.stopped())?;
        self.metrics.record_enqueued();
        Ok(())
    }

    /// Block until every record queued before this call reached the backend
    /// and the backend was flushed.
    fn flush(&self) -> Result<()> {
        let (ack_sender, ack_receiver) = bounded(1);
        {
            let guard = self.sender.read();
            let sender = guard.as_ref().ok_or_else(|| self.stopped())?;
            sender
                .send(Command::Flush(ack_sender))
                .map_err(|_| self.stopped())?;
        }
        ack_receiver.recv().map_err(|_| self.stopped())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SerializedSink {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
