use std::path::{Path, PathBuf};

use tracing::debug;

use super::{validate_key, KeyValueStore, StorageError};

/// Extension used for slot files in the data directory.
const SLOT_EXTENSION: &str = "slot";

/// Slots stored as individual files in a directory.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&data_dir).map_err(|source| StorageError::Write {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, SLOT_EXTENSION))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.slot_path(key);
        // Write beside the slot and rename so a crash never leaves a torn slot
        let tmp = self.data_dir.join(format!(".{}.tmp", key));
        std::fs::write(&tmp, value).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(slot = key, bytes = value.len(), "Slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = std::fs::read_dir(&self.data_dir).map_err(|source| StorageError::Read {
            path: self.data_dir.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SLOT_EXTENSION) {
                std::fs::remove_file(&path)
                    .map_err(|source| StorageError::Write { path: path.clone(), source })?;
            }
        }
        Ok(())
    }
}
