use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{validate_key, KeyValueStore, StorageError};

/// In-process slots. Clones share the same underlying map, which lets tests
/// simulate a reload by building a second store over the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.slots().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.slots().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.slots().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_slots() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("arm_lang", "es").unwrap();
        assert_eq!(other.get("arm_lang").unwrap().as_deref(), Some("es"));

        other.clear().unwrap();
        assert!(store.is_empty());
    }
}
