// # Memory Source
//
// In-process implementation of ConfigSource.
//
// ## Purpose
//
// Lets an embedding application (or a test) hand documents to a watcher
// without touching the filesystem. The handle is cheap to clone; every clone
// sees the same contents.
//
// ## Failure Behavior
//
// A cleared source behaves like a missing file: `read()` fails with a
// `NotFound` I/O error until new contents are set.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::SourceConfig;
use crate::traits::source::{ConfigSource, ConfigSourceFactory};

/// In-memory configuration source
///
/// # Example
///
/// ```rust,no_run
/// use proxy_config_core::source::MemorySource;
/// use proxy_config_core::traits::ConfigSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = MemorySource::with_contents(br#"{"Services": []}"#.to_vec());
///     let handle = source.clone();
///
///     handle.set(br#"{"Services": [{"Name": "a", "Port": 1, "Endpoints": []}]}"#.to_vec()).await;
///     assert!(source.read().await?.starts_with(b"{"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemorySource {
    /// Create an empty source; reads fail until contents are set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding a document
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(contents.into()))),
        }
    }

    /// Replace the document
    pub async fn set(&self, contents: impl Into<Vec<u8>>) {
        *self.inner.write().await = Some(contents.into());
    }

    /// Remove the document so that reads fail
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    async fn read(&self) -> Result<Vec<u8>, Error> {
        self.inner.read().await.clone().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "memory source has no contents",
            ))
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Factory for creating memory sources
///
/// Each created source starts empty. Embedders that need to feed it should
/// construct [`MemorySource`] directly and keep a handle.
pub struct MemorySourceFactory;

impl ConfigSourceFactory for MemorySourceFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn ConfigSource>, Error> {
        match config {
            SourceConfig::Memory => Ok(Box::new(MemorySource::new())),
            _ => Err(Error::config("Invalid config for memory source")),
        }
    }
}
