//! Shipped sink and backend implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleBackend;
#[cfg(feature = "file")]
pub use file::FileBackend;
pub use memory::{MemoryBackend, MemorySink};
