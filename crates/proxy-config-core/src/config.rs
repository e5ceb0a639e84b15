//! Configuration types for the watcher
//!
//! This module defines the source selection and the poll loop settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Where the declarative document comes from
    pub source: SourceConfig,

    /// Poll loop settings
    #[serde(default)]
    pub poll: PollConfig,
}

impl WatcherConfig {
    /// Create a configuration for a source with default poll settings
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            poll: PollConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.source.validate()?;
        self.poll.validate()?;
        Ok(())
    }
}

/// Source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Local file, re-read every cycle
    File {
        /// Path to the JSON document
        path: String,
    },

    /// Remote document fetched over HTTP
    Http {
        /// URL to GET every cycle
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },

    /// In-process source, fed by the embedding application
    Memory,

    /// Custom source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SourceConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File source path cannot be empty"));
                }
                Ok(())
            }
            SourceConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP source URL cannot be empty"));
                }
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "HTTP source URL must use http or https: {}",
                        url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP source timeout must be > 0"));
                }
                Ok(())
            }
            SourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom source factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom source config cannot be null"));
                }
                Ok(())
            }
            SourceConfig::Memory => Ok(()),
        }
    }

    /// Get the registry name for this source type
    pub fn type_name(&self) -> &str {
        match self {
            SourceConfig::File { .. } => "file",
            SourceConfig::Http { .. } => "http",
            SourceConfig::Memory => "memory",
            SourceConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    10
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed wait between cycles, in milliseconds
    ///
    /// Every cycle waits the same amount whether it succeeded, failed or
    /// dispatched. There is no backoff and no jitter.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Capacity of each outbound update channel
    ///
    /// After queueing an event the dispatcher waits for a free slot, so at
    /// most `channel_capacity - 1` events sit unread when a cycle ends. The
    /// default of 1 is a strict handoff: a cycle completes only once the
    /// consumer has taken every event it sent.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl PollConfig {
    /// Poll settings with a custom interval
    ///
    /// The interval is kept in whole milliseconds. Sub-millisecond remainders
    /// are dropped, so anything under 1 ms fails [`PollConfig::validate`];
    /// intervals beyond `u64::MAX` milliseconds saturate.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            poll_interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            ..Self::default()
        }
    }

    /// Set the outbound channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the poll settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_ms == 0 {
            return Err(crate::Error::config(
                "Poll interval must be at least 1 ms (sub-millisecond intervals are not supported)",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(crate::Error::config("Update channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_channel_capacity() -> usize {
    1
}
