//! Durable key-value slots.
//!
//! A slot is one named string value that survives process restarts. The
//! entity store keeps each persisted entity in its own slot:
//! - `FileStore`: one file per slot under the data directory
//! - `MemoryStore`: process-local slots for tests and ephemeral runs

pub mod error;
pub mod file;
pub mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Minimal string-keyed storage primitive.
///
/// Implementations take `&self`; any interior state is synchronized by the
/// implementation.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` means the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the whole content of a slot.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Drop every slot, as when the user clears site data.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Reject keys that could escape the storage namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
