// # Config Source Trait
//
// Defines the interface for fetching the raw declarative document.
//
// ## Implementations
//
// - File: `crate::source::FileSource`
// - In-memory: `crate::source::MemorySource`
// - HTTP: `proxy-config-source-http` crate
//
// ## Usage
//
// ```rust,ignore
// use proxy_config_core::ConfigSource;
//
// let source = /* ConfigSource implementation */;
// let bytes = source.read().await?;
// ```

use async_trait::async_trait;

/// Trait for pollable configuration sources
///
/// A source only fetches bytes. It does not parse, compare or remember what
/// it returned last time; the [`SourceReader`](crate::reader::SourceReader)
/// and the watcher own all cycle state.
///
/// ## Rules
///
/// - `read()` is called once per poll cycle, never concurrently for the same
///   watcher
/// - A failure must be returned as an error, not as empty bytes
/// - Implementations must not spawn their own polling loops; the watcher
///   owns the cadence
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the current raw document
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The document bytes, verbatim
    /// - `Err(Error)`: The source is unreachable or unreadable
    async fn read(&self) -> Result<Vec<u8>, crate::Error>;

    /// Human readable location of the source, for logs
    fn describe(&self) -> String;
}

/// Helper trait for constructing sources from configuration
pub trait ConfigSourceFactory: Send + Sync {
    /// Create a ConfigSource instance from configuration
    fn create(
        &self,
        config: &crate::config::SourceConfig,
    ) -> Result<Box<dyn ConfigSource>, crate::Error>;
}
