//! Core traits for the watcher
//!
//! - [`ConfigSource`]: Fetch the raw declarative document

pub mod source;

pub use source::{ConfigSource, ConfigSourceFactory};
