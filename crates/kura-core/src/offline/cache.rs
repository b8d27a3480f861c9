//! Named response caches.
//!
//! `CacheStorage` holds any number of namespaces; each `Cache` maps a
//! request URL to the last stored response. Handles are cheap to clone and
//! share the same underlying maps. Concurrent writers to one key race and
//! the last one wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::CacheError;
use super::request::{Method, Request, Response};

/// Suffix of namespace snapshot files.
const SNAPSHOT_SUFFIX: &str = ".cache.json";

#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, Response>>>,
}

impl Cache {
    /// Look up a stored response. Non-GET requests never match.
    pub async fn match_request(&self, request: &Request) -> Option<Response> {
        if request.method != Method::GET {
            return None;
        }
        self.entries.read().await.get(&request.url).cloned()
    }

    /// Store a response under the request URL, replacing any previous one.
    pub async fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        if request.method != Method::GET {
            return Err(CacheError::UnsupportedMethod(request.method.clone()));
        }
        self.entries.write().await.insert(request.url.clone(), response);
        Ok(())
    }

    pub async fn delete(&self, request: &Request) -> bool {
        self.entries.write().await.remove(&request.url).is_some()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    url: String,
    response: Response,
}

#[derive(Debug, Serialize, Deserialize)]
struct NamespaceSnapshot {
    name: String,
    entries: Vec<SnapshotEntry>,
}

/// All cache namespaces, in creation order.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    namespaces: Arc<RwLock<Vec<(String, Cache)>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a namespace, creating it when absent.
    pub async fn open(&self, name: &str) -> Cache {
        let mut namespaces = self.namespaces.write().await;
        if let Some((_, cache)) = namespaces.iter().find(|(n, _)| n == name) {
            return cache.clone();
        }
        debug!(namespace = name, "Creating cache namespace");
        let cache = Cache::default();
        namespaces.push((name.to_string(), cache.clone()));
        cache
    }

    /// Handle to an existing namespace; never creates one.
    pub async fn get(&self, name: &str) -> Option<Cache> {
        self.namespaces
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cache)| cache.clone())
    }

    pub async fn has(&self, name: &str) -> bool {
        self.namespaces.read().await.iter().any(|(n, _)| n == name)
    }

    pub async fn delete(&self, name: &str) -> bool {
        let mut namespaces = self.namespaces.write().await;
        let before = namespaces.len();
        namespaces.retain(|(n, _)| n != name);
        namespaces.len() != before
    }

    pub async fn keys(&self) -> Vec<String> {
        self.namespaces.read().await.iter().map(|(n, _)| n.clone()).collect()
    }

    /// First match across every namespace, oldest namespace first.
    pub async fn match_request(&self, request: &Request) -> Option<Response> {
        let caches: Vec<Cache> = self
            .namespaces
            .read()
            .await
            .iter()
            .map(|(_, c)| c.clone())
            .collect();
        for cache in caches {
            if let Some(response) = cache.match_request(request).await {
                return Some(response);
            }
        }
        None
    }

    // ===== Snapshots =====

    fn snapshot_path(dir: &Path, name: &str) -> Result<PathBuf, CacheError> {
        crate::storage::validate_key(name).map_err(|_| CacheError::InvalidName(name.to_string()))?;
        Ok(dir.join(format!("{}{}", name, SNAPSHOT_SUFFIX)))
    }

    /// Write every namespace to `dir`, one file each. Snapshot files of
    /// namespaces that no longer exist are removed.
    pub async fn save_to(&self, dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let namespaces = self.namespaces.read().await.clone();
        let mut written = Vec::with_capacity(namespaces.len());
        for (name, cache) in &namespaces {
            let entries = cache
                .entries
                .read()
                .await
                .iter()
                .map(|(url, response)| SnapshotEntry {
                    url: url.clone(),
                    response: response.clone(),
                })
                .collect();
            let snapshot = NamespaceSnapshot {
                name: name.clone(),
                entries,
            };
            let path = Self::snapshot_path(dir, name)?;
            let contents = serde_json::to_string(&snapshot)?;
            std::fs::write(&path, contents).map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        for path in Self::snapshot_files(dir)? {
            if !written.contains(&path) {
                debug!(path = %path.display(), "Removing snapshot of pruned namespace");
                std::fs::remove_file(&path).map_err(|source| CacheError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        info!(namespaces = namespaces.len(), dir = %dir.display(), "Cache snapshot saved");
        Ok(())
    }

    /// Rebuild storage from the snapshot files in `dir`. A missing directory
    /// yields empty storage.
    pub async fn load_from(dir: &Path) -> Result<Self, CacheError> {
        let storage = Self::new();
        if !dir.exists() {
            return Ok(storage);
        }

        let mut files = Self::snapshot_files(dir)?;
        files.sort();
        for path in files {
            let contents = std::fs::read_to_string(&path).map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            let snapshot: NamespaceSnapshot = serde_json::from_str(&contents)?;
            let cache = storage.open(&snapshot.name).await;
            let mut entries = cache.entries.write().await;
            for entry in snapshot.entries {
                entries.insert(entry.url, entry.response);
            }
        }
        Ok(storage)
    }

    fn snapshot_files(dir: &Path) -> Result<Vec<PathBuf>, CacheError> {
        let entries = std::fs::read_dir(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(SNAPSHOT_SUFFIX))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_match() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;
        let request = Request::get("/index.html");

        assert!(cache.match_request(&request).await.is_none());
        cache.put(&request, Response::ok("<html>")).await.unwrap();
        assert_eq!(cache.match_request(&request).await.unwrap().body, b"<html>");
        assert_eq!(storage.match_request(&request).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_post_is_never_stored_or_matched() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;
        let post = Request::post("/join");

        let err = cache.put(&post, Response::ok("merci")).await.unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedMethod(_)));
        assert!(cache.is_empty().await);

        // Same URL stored through GET is still invisible to a POST lookup
        cache.put(&Request::get("/join"), Response::ok("form")).await.unwrap();
        assert!(storage.match_request(&post).await.is_none());
    }

    #[tokio::test]
    async fn test_open_is_idempotent_and_delete_removes() {
        let storage = CacheStorage::new();
        let a = storage.open("v1").await;
        a.put(&Request::get("/"), Response::ok("root")).await.unwrap();
        let b = storage.open("v1").await;
        assert_eq!(b.len().await, 1);

        storage.open("v2").await;
        assert_eq!(storage.keys().await, ["v1", "v2"]);
        assert!(storage.delete("v1").await);
        assert!(!storage.delete("v1").await);
        assert_eq!(storage.keys().await, ["v2"]);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_and_prune() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CacheStorage::new();
        storage
            .open("old")
            .await
            .put(&Request::get("/"), Response::ok("v0"))
            .await
            .unwrap();
        storage
            .open("arm-v3-pro")
            .await
            .put(&Request::get("/"), Response::ok("v1"))
            .await
            .unwrap();
        storage.save_to(dir.path()).await.unwrap();

        storage.delete("old").await;
        storage.save_to(dir.path()).await.unwrap();

        let restored = CacheStorage::load_from(dir.path()).await.unwrap();
        assert_eq!(restored.keys().await, ["arm-v3-pro"]);
        let root = restored.match_request(&Request::get("/")).await.unwrap();
        assert_eq!(root.text(), "v1");
    }

    #[tokio::test]
    async fn test_load_from_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CacheStorage::load_from(&dir.path().join("absent")).await.unwrap();
        assert!(storage.keys().await.is_empty());
    }
}
