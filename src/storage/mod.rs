//! Durable key-value storage backends.
//!
//! The cart keeps its whole state in a single string record. Any backend
//! that can read and replace a string by key can hold it.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// A durable string store.
///
/// `set` must replace the value atomically: a concurrent or later `get`
/// sees either the old value or the new one, never a partial write.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value for `key`, `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
