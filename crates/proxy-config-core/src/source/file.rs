// # File Source
//
// Reads the declarative document from a local file on every cycle.
//
// ## Failure Behavior
//
// - Missing file, permission problems and transient filesystem faults are
//   returned as `Error::Io`
// - The watcher logs them and keeps the last accepted snapshot
// - A file that reappears is picked up on the next cycle
//
// ## File Format
//
// ```json
// { "Services": [
//   { "Name": "nodejs", "Port": 10000, "Endpoints": ["10.240.180.168:8000"] }
// ]}
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::config::SourceConfig;
use crate::traits::source::{ConfigSource, ConfigSourceFactory};

/// File-backed configuration source
///
/// # Example
///
/// ```rust,no_run
/// use proxy_config_core::source::FileSource;
/// use proxy_config_core::traits::ConfigSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = FileSource::new("/etc/proxy/services.json");
///     let bytes = source.read().await?;
///     println!("{} bytes", bytes.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for a path
    ///
    /// The file does not need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    async fn read(&self) -> Result<Vec<u8>, Error> {
        let data = fs::read(&self.path).await?;
        tracing::trace!("Read {} bytes from {}", data.len(), self.path.display());
        Ok(data)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Factory for creating file sources
pub struct FileSourceFactory;

impl ConfigSourceFactory for FileSourceFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn ConfigSource>, Error> {
        match config {
            SourceConfig::File { path } => Ok(Box::new(FileSource::new(path))),
            _ => Err(Error::config("Invalid config for file source")),
        }
    }
}
