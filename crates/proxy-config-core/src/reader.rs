//! Source reader with byte-level short-circuit
//!
//! Wraps a [`ConfigSource`] and remembers the last bytes a cycle finished
//! with. When a read yields byte-identical content the cycle can stop before
//! parsing. This is an optimisation only: the change detector still compares
//! parsed snapshots, so a source that re-serialises the same document
//! differently still produces no events.

use crate::error::Result;
use crate::traits::ConfigSource;

/// Result of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes that differ from the last ones marked as seen
    Changed(Vec<u8>),
    /// Byte-identical to the last ones marked as seen
    Unchanged,
}

/// Reads a source and filters byte-identical repeats
pub struct SourceReader {
    source: Box<dyn ConfigSource>,
    last_bytes: Option<Vec<u8>>,
}

impl SourceReader {
    pub fn new(source: Box<dyn ConfigSource>) -> Self {
        Self {
            source,
            last_bytes: None,
        }
    }

    /// Location of the wrapped source, for logs
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Read the source once
    ///
    /// A failed read leaves the remembered bytes untouched.
    pub async fn read(&mut self) -> Result<ReadOutcome> {
        let data = self.source.read().await?;

        if self.last_bytes.as_deref() == Some(data.as_slice()) {
            return Ok(ReadOutcome::Unchanged);
        }

        Ok(ReadOutcome::Changed(data))
    }

    /// Remember bytes the current cycle has fully handled
    ///
    /// Called for documents that were dispatched, found structurally
    /// identical, or rejected by the parser. A cycle interrupted before this
    /// call re-processes the same bytes next time.
    pub fn mark_seen(&mut self, data: Vec<u8>) {
        self.last_bytes = Some(data);
    }
}
