//! Declarative registry configuration
//!
//! A [`RegistryConfig`] describes sinks by id and wires them to the root and
//! to named loggers. Sink ids resolve against the sinks declared in the
//! document first, then against a caller-supplied [`SinkCatalog`] holding
//! sinks the document cannot describe (custom backends, shared instances).
//!
//! ```json
//! {
//!   "sinks": [
//!     { "id": "stdout", "kind": "console", "colors": false },
//!     { "id": "audit", "kind": "file", "path": "audit.log", "format": "json", "serialized": true },
//!     { "id": "plain", "kind": "file", "path": "app.log", "format": { "pattern": "%d [%l] %n - %m" } }
//!   ],
//!   "root": { "level": "warn", "sinks": ["stdout"] },
//!   "loggers": [
//!     { "name": "app.audit", "level": "info", "sinks": ["audit", "stdout"] }
//!   ]
//! }
//! ```

use crate::core::registry::{validate_name, LoggerConfig, ROOT_LOGGER_NAME};
use crate::core::{
    Backend, DirectSink, LogLevel, LoggerError, OutputFormat, Registry, Result, SerializedSink,
    Sink, TimestampFormat,
};
use crate::sinks::MemorySink;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Kind of sink a definition builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Console,
    File,
    Memory,
}

/// One sink declared in a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkDefinition {
    pub id: String,
    pub kind: SinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,
    /// Give the backend its own worker thread
    #[serde(default)]
    pub serialized: bool,
}

/// Root section; missing fields fall back to level Info and no sinks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Vec<String>>,
}

/// A named logger; missing fields are inherited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Vec<String>>,
}

/// Whole-registry configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default)]
    pub sinks: Vec<SinkDefinition>,
    #[serde(default)]
    pub root: RootDefinition,
    #[serde(default)]
    pub loggers: Vec<LoggerDefinition>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading configuration", path.display().to_string(), e)
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks that need no sink to be built.
    ///
    /// Sink ids must be non-empty and unique across the document and
    /// `catalog`; logger names must be valid and unique; every reference
    /// must name a known sink.
    pub fn validate(&self, catalog: &SinkCatalog) -> Result<()> {
        let mut declared = HashSet::new();
        for definition in &self.sinks {
            if definition.id.trim().is_empty() {
                return Err(LoggerError::config("sinks", "empty sink id"));
            }
            if !declared.insert(definition.id.as_str()) || catalog.contains(&definition.id) {
                return Err(LoggerError::config(
                    format!("sink '{}'", definition.id),
                    "id declared more than once",
                ));
            }
            if definition.kind == SinkKind::File && definition.path.is_none() {
                return Err(LoggerError::config(
                    format!("sink '{}'", definition.id),
                    "file sinks require a path",
                ));
            }
            if let Some(ref timestamp) = definition.timestamp {
                timestamp.validate()?;
            }
        }

        let known = |id: &str| declared.contains(id) || catalog.contains(id);

        for id in self.root.sinks.iter().flatten() {
            if !known(id.as_str()) {
                return Err(LoggerError::unknown_sink(ROOT_LOGGER_NAME, id.as_str()));
            }
        }

        let mut names = HashSet::new();
        for logger in &self.loggers {
            if logger.name.is_empty() || logger.name == ROOT_LOGGER_NAME {
                return Err(LoggerError::invalid_name(
                    logger.name.as_str(),
                    "use the root section to configure the root",
                ));
            }
            validate_name(&logger.name)?;
            if !names.insert(logger.name.as_str()) {
                return Err(LoggerError::config(
                    format!("logger '{}'", logger.name),
                    "configured more than once",
                ));
            }
            for id in logger.sinks.iter().flatten() {
                if !known(id.as_str()) {
                    return Err(LoggerError::unknown_sink(logger.name.as_str(), id.as_str()));
                }
            }
        }

        Ok(())
    }
}

impl SinkDefinition {
    /// Build the sink this definition describes
    fn build(&self, built: &mut SinkCatalog) -> Result<()> {
        let sink = match self.kind {
            SinkKind::Console => self.build_console()?,
            SinkKind::File => self.build_file()?,
            SinkKind::Memory => {
                let memory = MemorySink::with_name(self.id.as_str());
                let sink = if self.serialized {
                    wrap(memory.backend(), true)?
                } else {
                    memory.shared()
                };
                built.memories.insert(self.id.clone(), memory);
                sink
            }
        };
        built.insert(self.id.clone(), sink);
        Ok(())
    }

    #[cfg(feature = "console")]
    fn build_console(&self) -> Result<Arc<dyn Sink>> {
        let backend = crate::sinks::ConsoleBackend::with_colors(self.colors.unwrap_or(true))
            .with_name(self.id.as_str())
            .with_output_format(self.format.clone().unwrap_or_default())
            .with_timestamp_format(self.timestamp.clone().unwrap_or_default());
        wrap(backend, self.serialized)
    }

    #[cfg(not(feature = "console"))]
    fn build_console(&self) -> Result<Arc<dyn Sink>> {
        Err(LoggerError::config(
            format!("sink '{}'", self.id),
            "console sinks need the `console` feature",
        ))
    }

    #[cfg(feature = "file")]
    fn build_file(&self) -> Result<Arc<dyn Sink>> {
        let path = self.path.as_ref().ok_or_else(|| {
            LoggerError::config(format!("sink '{}'", self.id), "file sinks require a path")
        })?;
        let backend = crate::sinks::FileBackend::new(path)?
            .with_name(self.id.as_str())
            .with_output_format(self.format.clone().unwrap_or_default())
            .with_timestamp_format(self.timestamp.clone().unwrap_or_default());
        wrap(backend, self.serialized)
    }

    #[cfg(not(feature = "file"))]
    fn build_file(&self) -> Result<Arc<dyn Sink>> {
        Err(LoggerError::config(
            format!("sink '{}'", self.id),
            "file sinks need the `file` feature",
        ))
    }
}

fn wrap<B: Backend + 'static>(backend: B, serialized: bool) -> Result<Arc<dyn Sink>> {
    if serialized {
        Ok(SerializedSink::new(backend)?.shared())
    } else {
        Ok(DirectSink::new(backend).shared())
    }
}

/// Sinks addressable by id from a configuration document
#[derive(Clone, Default)]
pub struct SinkCatalog {
    sinks: HashMap<String, Arc<dyn Sink>>,
    memories: HashMap<String, MemorySink>,
}

impl SinkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` under `id`, returning the sink it replaced
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        sink: Arc<dyn Sink>,
    ) -> Option<Arc<dyn Sink>> {
        self.sinks.insert(id.into(), sink)
    }

    #[must_use]
    pub fn with(mut self, id: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        self.insert(id, sink);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Sink>> {
        self.sinks.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sinks.contains_key(id)
    }

    /// Inspection handle for a `memory` sink built from a document
    pub fn memory(&self, id: &str) -> Option<MemorySink> {
        self.memories.get(id).cloned()
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sinks.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn lookup(
        &self,
        extra: &SinkCatalog,
        owner: &str,
        ids: &[String],
    ) -> Result<Vec<Arc<dyn Sink>>> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .or_else(|| extra.get(id))
                    .ok_or_else(|| LoggerError::unknown_sink(owner, id.as_str()))
            })
            .collect()
    }
}

impl fmt::Debug for SinkCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkCatalog")
            .field("ids", &self.ids())
            .finish()
    }
}

impl Registry {
    /// Replace the whole configuration with `config` in one swap.
    ///
    /// The document is validated before any sink is built; if validation or
    /// building fails the registry keeps its previous configuration. Returns
    /// the sinks built from the document's `sinks` section.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_facade::prelude::*;
    ///
    /// let registry = Registry::new();
    /// let config = RegistryConfig::from_json(r#"{
    ///     "sinks": [{ "id": "capture", "kind": "memory" }],
    ///     "root": { "level": "warn" },
    ///     "loggers": [{ "name": "app.net", "level": "debug", "sinks": ["capture"] }]
    /// }"#).unwrap();
    ///
    /// let built = registry.apply(&config, &SinkCatalog::new()).unwrap();
    /// registry.get_logger("app.net.http").debug("connected");
    ///
    /// assert_eq!(built.memory("capture").unwrap().len(), 1);
    /// ```
    pub fn apply(&self, config: &RegistryConfig, catalog: &SinkCatalog) -> Result<SinkCatalog> {
        config.validate(catalog)?;

        let mut built = SinkCatalog::new();
        for definition in &config.sinks {
            definition.build(&mut built)?;
        }

        let mut root = LoggerConfig::new();
        root.min_level = config.root.level;
        if let Some(ref ids) = config.root.sinks {
            root.sinks = Some(built.lookup(catalog, ROOT_LOGGER_NAME, ids)?);
        }

        let mut loggers = Vec::with_capacity(config.loggers.len());
        for definition in &config.loggers {
            let sinks = match definition.sinks {
                Some(ref ids) => Some(built.lookup(catalog, &definition.name, ids)?),
                None => None,
            };
            loggers.push((
                definition.name.clone(),
                LoggerConfig {
                    min_level: definition.level,
                    sinks,
                },
            ));
        }

        self.configure_all(root, loggers)?;
        Ok(built)
    }

    /// Parse `json` and [`apply`](Self::apply) it
    pub fn apply_json(&self, json: &str, catalog: &SinkCatalog) -> Result<SinkCatalog> {
        self.apply(&RegistryConfig::from_json(json)?, catalog)
    }
}
