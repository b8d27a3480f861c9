use std::path::PathBuf;

use thiserror::Error;

use super::request::Method;
use super::worker::WorkerState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Only GET requests can be cached, got {0}")]
    UnsupportedMethod(Method),

    #[error("Invalid cache namespace name: {0:?}")]
    InvalidName(String),

    #[error("Cache snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache snapshot is malformed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Install failed: {0}")]
    Install(#[from] FetchError),

    #[error("Cache storage failed: {0}")]
    Cache(#[from] CacheError),

    #[error("Cannot {action} a worker in state {state:?}")]
    InvalidState {
        action: &'static str,
        state: WorkerState,
    },
}
