//! Plugin-based source registry
//!
//! The registry allows configuration sources to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the daemon.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use proxy_config_core::registry::SourceRegistry;
//! use proxy_config_core::config::SourceConfig;
//!
//! let registry = SourceRegistry::with_builtin();
//! proxy_config_source_http::register(&registry);
//!
//! let source = registry.create_source(&SourceConfig::File {
//!     path: "/etc/proxy/services.json".into(),
//! })?;
//! ```

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::source::{FileSourceFactory, MemorySourceFactory};
use crate::traits::{ConfigSource, ConfigSourceFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of source factories keyed by source type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct SourceRegistry {
    sources: RwLock<HashMap<String, Box<dyn ConfigSourceFactory>>>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `file` and `memory` sources registered
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_source("file", Box::new(FileSourceFactory));
        registry.register_source("memory", Box::new(MemorySourceFactory));
        registry
    }

    /// Register a source factory
    ///
    /// Registering an existing name replaces the previous factory.
    ///
    /// # Parameters
    ///
    /// - `name`: Source type name (e.g., "file", "http")
    /// - `factory`: Factory object for creating source instances
    pub fn register_source(&self, name: impl Into<String>, factory: Box<dyn ConfigSourceFactory>) {
        let name = name.into();
        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        sources.insert(name, factory);
    }

    /// Create a source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ConfigSource>)`: Created source instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_source(&self, config: &SourceConfig) -> Result<Box<dyn ConfigSource>> {
        config.validate()?;

        let type_name = config.type_name();
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        let factory = sources.get(type_name).ok_or_else(|| {
            Error::not_found(format!("Source type '{}' is not registered", type_name))
        })?;

        factory.create(config)
    }

    /// Check whether a source type is registered
    pub fn has_source(&self, name: &str) -> bool {
        self.sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// List registered source types, sorted
    pub fn source_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
