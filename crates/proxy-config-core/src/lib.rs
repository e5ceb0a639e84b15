// # proxy-config-core
//
// Declarative configuration watcher for the service proxy control plane.
//
// ## Architecture Overview
//
// This library keeps an in-process view of "which services exist and which
// endpoints serve them" in sync with a periodically re-read declarative
// source:
// - **ConfigSource**: Trait for fetching the raw document (file, memory, HTTP)
// - **SourceReader**: Skips cycles whose bytes did not change
// - **parser**: Turns bytes into a validated Snapshot
// - **diff**: Deep, per-family comparison against the last accepted Snapshot
// - **UpdateDispatcher**: Full-replacement events on one channel per family
// - **ConfigWatcher**: The poll loop that sequences all of the above
// - **SourceRegistry**: Plugin-based registry for source types
//
// ## Design Principles
//
// 1. **Owned cycle state**: Each watcher owns its last bytes, snapshot and channels
// 2. **Full replace**: Consumers always receive whole families, never patches
// 3. **Handoff**: Dispatch waits for the consumer before the cycle ends
// 4. **Error isolation**: Bad or missing documents are logged, never fatal

pub mod traits;
pub mod source;
pub mod model;
pub mod reader;
pub mod parser;
pub mod diff;
pub mod dispatch;
pub mod watcher;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ConfigSource, ConfigSourceFactory};
pub use model::{
    EndpointFact, EndpointsUpdate, Operation, ServiceFact, ServiceUpdate, Snapshot, Update,
    UpdateEvent,
};
pub use diff::ChangeSet;
pub use dispatch::{UpdateDispatcher, UpdateReceivers};
pub use watcher::{ConfigWatcher, CycleOutcome, WatcherHandle};
pub use registry::SourceRegistry;
pub use config::{PollConfig, SourceConfig, WatcherConfig};
pub use error::{Error, Result};
pub use source::{FileSource, MemorySource};
