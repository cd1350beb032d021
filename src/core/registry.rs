//! Logger registry with hierarchical name resolution
//!
//! The registry maps dot-separated logger names to configurations. A name
//! without its own configuration inherits from the nearest configured
//! ancestor (`app.net.http` → `app.net` → `app` → root), field by field.
//!
//! Configuration lives in an immutable snapshot. Every change builds a new
//! snapshot and swaps it in under a short write lock, so a resolving thread
//! sees either the old or the new configuration, never a mix of both.

use super::{
    error::{LoggerError, Result},
    fallback::{stderr_fallback, FallbackHandler},
    log_level::LogLevel,
    logger::{flush_all, Logger},
    metrics::DeliveryMetrics,
    sink::Sink,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Name under which the root configuration can be addressed; `""` works too
pub const ROOT_LOGGER_NAME: &str = "root";

/// Separator between segments of a hierarchical logger name
pub const NAME_SEPARATOR: char = '.';

type SinkList = Arc<[Arc<dyn Sink>]>;

/// Explicit configuration for one logger name.
///
/// Unset fields are inherited from the nearest ancestor that sets them.
#[derive(Clone, Default)]
pub struct LoggerConfig {
    pub min_level: Option<LogLevel>,
    pub sinks: Option<Vec<Arc<dyn Sink>>>,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Set the sink list; an empty list means "explicitly no sinks"
    #[must_use]
    pub fn sinks(mut self, sinks: Vec<Arc<dyn Sink>>) -> Self {
        self.sinks = Some(sinks);
        self
    }

    /// Append one sink, starting an explicit list if none was set
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.get_or_insert_with(Vec::new).push(sink);
        self
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("min_level", &self.min_level)
            .field(
                "sinks",
                &self
                    .sinks
                    .as_ref()
                    .map(|sinks| sinks.iter().map(|s| s.name().to_string()).collect::<Vec<_>>()),
            )
            .finish()
    }
}

#[derive(Clone)]
struct Entry {
    min_level: Option<LogLevel>,
    sinks: Option<SinkList>,
}

impl From<LoggerConfig> for Entry {
    fn from(config: LoggerConfig) -> Self {
        Self {
            min_level: config.min_level,
            sinks: config.sinks.map(Into::into),
        }
    }
}

/// One immutable configuration generation plus its resolution cache
struct Snapshot {
    root_level: LogLevel,
    root_sinks: SinkList,
    entries: HashMap<String, Entry>,
    cache: RwLock<HashMap<String, Arc<Logger>>>,
}

impl Snapshot {
    fn new(root_level: LogLevel, root_sinks: SinkList, entries: HashMap<String, Entry>) -> Self {
        Self {
            root_level,
            root_sinks,
            entries,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn default_root() -> Self {
        Self::new(LogLevel::Info, Vec::new().into(), HashMap::new())
    }

    /// Copy the configuration, leaving the cache behind
    fn derive(&self) -> (LogLevel, SinkList, HashMap<String, Entry>) {
        (self.root_level, Arc::clone(&self.root_sinks), self.entries.clone())
    }

    fn resolve(&self, name: &str, metrics: &Arc<DeliveryMetrics>, fallback: &FallbackHandler) -> Arc<Logger> {
        let key = if is_root(name) { "" } else { name };

        if let Some(logger) = self.cache.read().get(key) {
            return Arc::clone(logger);
        }

        let (logger, anchored) = self.build(key, metrics, fallback);
        let logger = Arc::new(logger);
        // Only the root and names below a configured entry are cached;
        // unanchored names are rebuilt on every resolve.
        if !anchored {
            return logger;
        }

        let mut cache = self.cache.write();
        // Another thread may have won the race; keep a single instance per name
        Arc::clone(cache.entry(key.to_string()).or_insert(logger))
    }

    /// Resolved logger plus whether the root or a configured entry anchored it
    fn build(
        &self,
        key: &str,
        metrics: &Arc<DeliveryMetrics>,
        fallback: &FallbackHandler,
    ) -> (Logger, bool) {
        let mut level = None;
        let mut sinks = None;

        if !key.is_empty() {
            for candidate in ancestry(key) {
                if let Some(entry) = self.entries.get(candidate) {
                    if level.is_none() {
                        level = entry.min_level.map(|l| (l, candidate.to_string()));
                    }
                    if sinks.is_none() {
                        sinks = entry
                            .sinks
                            .as_ref()
                            .map(|s| (Arc::clone(s), candidate.to_string()));
                    }
                    if level.is_some() && sinks.is_some() {
                        break;
                    }
                }
            }
        }

        let anchored = key.is_empty() || level.is_some() || sinks.is_some();
        let name = if key.is_empty() { ROOT_LOGGER_NAME } else { key };
        let logger = Logger::resolved(
            name.to_string(),
            level.unwrap_or_else(|| (self.root_level, ROOT_LOGGER_NAME.to_string())),
            sinks.unwrap_or_else(|| (Arc::clone(&self.root_sinks), ROOT_LOGGER_NAME.to_string())),
            Arc::clone(metrics),
            Arc::clone(fallback),
        );
        (logger, anchored)
    }

    #[cfg(test)]
    fn cached_names(&self) -> usize {
        self.cache.read().len()
    }

    fn distinct_sinks(&self) -> Vec<Arc<dyn Sink>> {
        let mut seen = HashSet::new();
        let all = self
            .root_sinks
            .iter()
            .chain(self.entries.values().filter_map(|e| e.sinks.as_ref()).flat_map(|s| s.iter()));

        let mut distinct = Vec::new();
        for sink in all {
            if seen.insert(Arc::as_ptr(sink) as *const ()) {
                distinct.push(Arc::clone(sink));
            }
        }
        distinct
    }
}

/// `a.b.c` yields `a.b.c`, `a.b`, `a`
fn ancestry(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |&current| {
        current.rfind(NAME_SEPARATOR).map(|idx| &current[..idx])
    })
    .filter(|candidate| !candidate.is_empty())
}

fn is_root(name: &str) -> bool {
    name.is_empty() || name == ROOT_LOGGER_NAME
}

/// Reject names that could never be resolved as written
pub fn validate_name(name: &str) -> Result<()> {
    if name.starts_with(NAME_SEPARATOR) {
        return Err(LoggerError::invalid_name(name, "leading separator"));
    }
    if name.ends_with(NAME_SEPARATOR) {
        return Err(LoggerError::invalid_name(name, "trailing separator"));
    }
    if name.split(NAME_SEPARATOR).any(str::is_empty) {
        return Err(LoggerError::invalid_name(name, "empty segment"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(LoggerError::invalid_name(name, "whitespace or control character"));
    }
    Ok(())
}

struct Inner {
    current: RwLock<Arc<Snapshot>>,
    /// Serializes writers so read-modify-swap sequences never interleave
    writer: Mutex<()>,
    generation: AtomicU64,
    metrics: Arc<DeliveryMetrics>,
    fallback: FallbackHandler,
}

/// Process-wide logger store, passed around as a cheap cloneable handle.
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// let registry = Registry::new();
/// let capture = MemorySink::new();
///
/// registry.configure_root(LogLevel::Warn, Vec::new()).unwrap();
/// registry
///     .configure("app.net", Some(LogLevel::Debug), Some(vec![capture.shared()]))
///     .unwrap();
///
/// let http = registry.resolve("app.net.http");
/// assert_eq!(http.min_level(), LogLevel::Debug);
/// assert_eq!(http.sinks_source(), "app.net");
///
/// registry.get_logger("app.net.http").debug("handshake");
/// registry.get_logger("app.other").debug("dropped");
/// assert_eq!(capture.len(), 1);
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// Registry with the root default: level Info, no sinks
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.current.read())
    }

    /// Swap in a new snapshot, then announce it through the generation counter
    fn publish(&self, snapshot: Snapshot) {
        *self.inner.current.write() = Arc::new(snapshot);
        self.inner.generation.fetch_add(1, Ordering::Release);
    }

    /// Effective logger for `name`.
    ///
    /// Names at or below a configured entry, and the root, return the same
    /// instance for repeated calls until the next reconfiguration. Names with
    /// no configured ancestor inherit everything from the root and are built
    /// fresh on each call without being cached. `""` and `"root"` resolve to
    /// the root directly.
    pub fn resolve(&self, name: &str) -> Arc<Logger> {
        self.snapshot()
            .resolve(name, &self.inner.metrics, &self.inner.fallback)
    }

    /// Set the explicit configuration of `name`, replacing any previous one.
    ///
    /// `None` fields are inherited. For the root, `None` keeps the current
    /// value since the root has no ancestor to inherit from.
    pub fn configure(
        &self,
        name: &str,
        min_level: Option<LogLevel>,
        sinks: Option<Vec<Arc<dyn Sink>>>,
    ) -> Result<()> {
        self.configure_with(name, LoggerConfig { min_level, sinks })
    }

    /// Same as [`configure`](Self::configure) with a [`LoggerConfig`] value
    pub fn configure_with(&self, name: &str, config: LoggerConfig) -> Result<()> {
        if !is_root(name) {
            validate_name(name)?;
        }

        let _writer = self.inner.writer.lock();
        let (mut root_level, mut root_sinks, mut entries) = self.snapshot().derive();

        if is_root(name) {
            if let Some(level) = config.min_level {
                root_level = level;
            }
            if let Some(sinks) = config.sinks {
                root_sinks = sinks.into();
            }
        } else {
            entries.insert(name.to_string(), config.into());
        }

        self.publish(Snapshot::new(root_level, root_sinks, entries));
        Ok(())
    }

    /// Set both root fields at once
    pub fn configure_root(&self, min_level: LogLevel, sinks: Vec<Arc<dyn Sink>>) -> Result<()> {
        self.configure(ROOT_LOGGER_NAME, Some(min_level), Some(sinks))
    }

    /// Replace the whole configuration in one swap.
    ///
    /// Every name is validated first; on error nothing changes.
    pub fn configure_all<I>(&self, root: LoggerConfig, loggers: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, LoggerConfig)>,
    {
        let mut entries = HashMap::new();
        for (name, config) in loggers {
            if is_root(&name) {
                return Err(LoggerError::invalid_name(
                    name,
                    "the root is configured separately",
                ));
            }
            validate_name(&name)?;
            if entries.insert(name.clone(), Entry::from(config)).is_some() {
                return Err(LoggerError::config(
                    format!("logger '{}'", name),
                    "configured more than once",
                ));
            }
        }

        let root_level = root.min_level.unwrap_or_default();
        let root_sinks: SinkList = root.sinks.unwrap_or_default().into();

        let _writer = self.inner.writer.lock();
        self.publish(Snapshot::new(root_level, root_sinks, entries));
        Ok(())
    }

    /// Drop the explicit configuration of `name`; returns whether it existed
    pub fn remove(&self, name: &str) -> bool {
        if is_root(name) {
            return false;
        }

        let _writer = self.inner.writer.lock();
        let (root_level, root_sinks, mut entries) = self.snapshot().derive();
        if entries.remove(name).is_none() {
            return false;
        }
        self.publish(Snapshot::new(root_level, root_sinks, entries));
        true
    }

    /// Back to a single root default (level Info, no sinks)
    pub fn reset(&self) {
        let _writer = self.inner.writer.lock();
        self.publish(Snapshot::default_root());
    }

    /// Counter bumped by every reconfiguration
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Names with an explicit configuration, sorted
    pub fn configured_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `name` has an explicit configuration
    pub fn is_configured(&self, name: &str) -> bool {
        is_root(name) || self.snapshot().entries.contains_key(name)
    }

    /// Flush every distinct sink of the current configuration
    pub fn flush(&self) -> Result<()> {
        flush_all(self.snapshot().distinct_sinks().iter())
    }

    /// Delivery counters shared by every logger this registry resolves
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.inner.metrics
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Registry")
            .field("generation", &self.generation())
            .field("root_level", &snapshot.root_level)
            .field("configured", &self.configured_names())
            .finish()
    }
}

/// Builder for constructing a Registry with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let registry = Registry::builder()
///     .root_level(LogLevel::Debug)
///     .root_sink(MemorySink::new().shared())
///     .build();
///
/// assert_eq!(registry.resolve("anything").min_level(), LogLevel::Debug);
/// ```
pub struct RegistryBuilder {
    root_level: LogLevel,
    root_sinks: Vec<Arc<dyn Sink>>,
    fallback: FallbackHandler,
}

impl RegistryBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            root_level: LogLevel::Info,
            root_sinks: Vec::new(),
            fallback: stderr_fallback(),
        }
    }

    /// Set the root minimum level
    #[must_use = "builder methods return a new value"]
    pub fn root_level(mut self, level: LogLevel) -> Self {
        self.root_level = level;
        self
    }

    /// Add a root sink
    #[must_use = "builder methods return a new value"]
    pub fn root_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.root_sinks.push(sink);
        self
    }

    /// Set the handler receiving sink failures of every resolved logger
    #[must_use = "builder methods return a new value"]
    pub fn fallback(mut self, fallback: FallbackHandler) -> Self {
        self.fallback = fallback;
        self
    }

    /// Build the Registry
    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(Snapshot::new(
                    self.root_level,
                    self.root_sinks.into(),
                    HashMap::new(),
                ))),
                writer: Mutex::new(()),
                generation: AtomicU64::new(0),
                metrics: Arc::new(DeliveryMetrics::new()),
                fallback: self.fallback,
            }),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
