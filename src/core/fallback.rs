//! Fallback diagnostic channel for sink failures
//!
//! A failing sink must never surface at the log call site. Failures are
//! caught here, counted, and handed to a [`FallbackHandler`]; the default
//! handler prints a line to stderr.

use super::{error::Result, metrics::DeliveryMetrics};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Which sink operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOperation {
    Accept,
    Flush,
}

impl fmt::Display for SinkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkOperation::Accept => write!(f, "accept"),
            SinkOperation::Flush => write!(f, "flush"),
        }
    }
}

/// Description of one isolated sink failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink: String,
    pub operation: SinkOperation,
    pub message: String,
    pub panicked: bool,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(
                f,
                "Sink '{}' panicked during {}: {}. Other sinks continue to function.",
                self.sink, self.operation, self.message
            )
        } else {
            write!(f, "Sink '{}' {} failed: {}", self.sink, self.operation, self.message)
        }
    }
}

/// Callback type for sink failure notifications
pub type FallbackHandler = Arc<dyn Fn(&SinkFailure) + Send + Sync>;

/// Handler that writes failures to stderr
pub fn stderr_fallback() -> FallbackHandler {
    Arc::new(|failure: &SinkFailure| {
        if failure.panicked {
            eprintln!("[LOGGER CRITICAL] {}", failure);
        } else {
            eprintln!("[LOGGER ERROR] {}", failure);
        }
    })
}

/// Handler that discards failures
pub fn silent_fallback() -> FallbackHandler {
    Arc::new(|_: &SinkFailure| {})
}

fn panic_message(panic_info: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run one sink operation with panic isolation.
///
/// Returns `true` when the operation succeeded. Failures are counted in
/// `metrics` and reported to `fallback`; they are never propagated.
pub(crate) fn isolate<F>(
    sink: &str,
    operation: SinkOperation,
    metrics: &DeliveryMetrics,
    fallback: &FallbackHandler,
    f: F,
) -> bool
where
    F: FnOnce() -> Result<()>,
{
    let failure = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => {
            if operation == SinkOperation::Accept {
                metrics.record_delivered();
            }
            return true;
        }
        Ok(Err(e)) => {
            metrics.record_failed();
            SinkFailure {
                sink: sink.to_string(),
                operation,
                message: e.to_string(),
                panicked: false,
            }
        }
        Err(panic_info) => {
            metrics.record_panicked();
            SinkFailure {
                sink: sink.to_string(),
                operation,
                message: panic_message(panic_info),
                panicked: true,
            }
        }
    };

    // A panicking handler must not escape either.
    if catch_unwind(AssertUnwindSafe(|| fallback(&failure))).is_err() {
        eprintln!("[LOGGER CRITICAL] Fallback handler panicked while reporting: {}", failure);
    }
    false
}
