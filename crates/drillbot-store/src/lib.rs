//! # drillbot Store
//!
//! Durable flat key-value storage shared by the coordinator, the observer and
//! the control surface.
//!
//! - [`MemoryStore`] - in-process store for tests and ephemeral runs
//! - [`FileStore`] - single JSON document on disk, rewritten atomically

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
