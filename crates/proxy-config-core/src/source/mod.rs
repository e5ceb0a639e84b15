// # Built-in Sources
//
// Implementations of the ConfigSource trait that ship with the core crate.

pub mod file;
pub mod memory;

pub use file::{FileSource, FileSourceFactory};
pub use memory::{MemorySource, MemorySourceFactory};
