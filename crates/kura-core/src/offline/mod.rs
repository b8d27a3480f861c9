//! Offline cache worker.
//!
//! Intercepts the page's GET requests and answers them stale-while-revalidate
//! from a versioned cache namespace. Requests other than GET and calls to
//! the AI/search services are never intercepted.
//!
//! - `OfflineWorker`: one generation (install, activate, fetch)
//! - `Registration`: which generation controls the page
//! - `CacheStorage`: named response caches with on-disk snapshots
//! - `Network`: the fetch capability, `HttpNetwork` over reqwest

pub mod cache;
pub mod error;
pub mod network;
pub mod policy;
pub mod registration;
pub mod request;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{Cache, CacheStorage};
pub use error::{CacheError, FetchError, LifecycleError};
pub use network::{HttpNetwork, Network};
pub use policy::ExclusionRule;
pub use registration::Registration;
pub use request::{Method, Request, RequestMode, Response};
pub use worker::{FetchOutcome, OfflineWorker, ResponseSource, WorkerSettings, WorkerState};
