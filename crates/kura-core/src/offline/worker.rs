//! One generation of the offline cache worker.
//!
//! A worker owns a versioned cache namespace. It is installed (warm assets
//! fetched and stored), activated (every other namespace deleted) and then
//! answers fetches stale-while-revalidate: a cached copy is returned at once
//! while the network refreshes the namespace for the next request.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cache::{Cache, CacheStorage};
use super::error::{FetchError, LifecycleError};
use super::network::Network;
use super::policy::{ExclusionRule, DEFAULT_EXCLUSIONS};
use super::request::{Request, Response};

/// Name of the current cache generation. Changing it invalidates every
/// previously cached byte on the next activation.
pub const DEFAULT_CACHE_VERSION: &str = "arm-v3-pro";

/// Path of the page root served as the offline shell for navigations.
pub const ROOT_DOCUMENT: &str = "/";

pub const DEFAULT_WARM_ASSETS: [&str; 4] = [
    "/",
    "/index.html",
    "https://cdn.tailwindcss.com",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700;900&family=Noto+Sans+Arabic:wght@400;700;900&display=swap",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Cache namespace of this generation.
    pub version: String,
    /// Fetched and stored unconditionally at install time, in order.
    pub warm_assets: Vec<String>,
    /// URL fragments never intercepted.
    pub exclusions: Vec<String>,
    /// Origin of the page; same-origin URLs are cached by path.
    pub origin: String,
    pub skip_waiting: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_CACHE_VERSION.to_string(),
            warm_assets: DEFAULT_WARM_ASSETS.iter().map(|s| s.to_string()).collect(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            origin: "http://localhost:3000".to_string(),
            skip_waiting: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached root document served for a failed navigation.
    OfflineShell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller performs the request itself.
    Passthrough,
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

pub struct OfflineWorker<N: Network + 'static> {
    settings: WorkerSettings,
    exclusions: ExclusionRule,
    network: Arc<N>,
    caches: CacheStorage,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
    claimed: AtomicBool,
    revalidations: Mutex<Vec<JoinHandle<()>>>,
}

impl<N: Network + 'static> OfflineWorker<N> {
    pub fn new(settings: WorkerSettings, network: Arc<N>, caches: CacheStorage) -> Self {
        let exclusions = ExclusionRule::new(settings.exclusions.iter().cloned());
        Self {
            settings,
            exclusions,
            network,
            caches,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
            revalidations: Mutex::new(Vec::new()),
        }
    }

    pub fn version(&self) -> &str {
        &self.settings.version
    }

    pub fn caches(&self) -> &CacheStorage {
        &self.caches
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> WorkerState {
        *self.lock_state()
    }

    fn transition(&self, from: WorkerState, to: WorkerState, action: &'static str) -> Result<(), LifecycleError> {
        let mut state = self.lock_state();
        if *state != from {
            return Err(LifecycleError::InvalidState { action, state: *state });
        }
        *state = to;
        Ok(())
    }

    pub(crate) fn mark_redundant(&self) {
        *self.lock_state() = WorkerState::Redundant;
    }

    /// Whether this generation asked to skip the waiting phase.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Whether this generation controls open pages.
    pub fn has_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    /// Cache key for a request: same-origin URLs are reduced to their path.
    fn normalize(&self, request: &Request) -> Request {
        let origin = self.settings.origin.trim_end_matches('/');
        match request.url.strip_prefix(origin) {
            Some("") => request.with_url(ROOT_DOCUMENT),
            Some(path) if path.starts_with('/') => request.with_url(path),
            _ => request.clone(),
        }
    }

    // ===== Lifecycle =====

    /// Fetch and store every warm asset. Nothing is stored unless all of
    /// them succeed; a failed install leaves the worker redundant.
    pub async fn install(&self) -> Result<(), LifecycleError> {
        self.transition(WorkerState::Parsed, WorkerState::Installing, "install")?;
        info!(version = %self.settings.version, assets = self.settings.warm_assets.len(), "Installing cache worker");

        let fetches = self.settings.warm_assets.iter().map(|url| {
            let request = self.normalize(&Request::get(url.as_str()));
            let network = Arc::clone(&self.network);
            async move {
                let response = network.fetch(&request).await?;
                if !response.is_success() {
                    return Err(FetchError::BadStatus {
                        url: request.url.clone(),
                        status: response.status,
                    });
                }
                Ok((request, response))
            }
        });

        let fetched = match try_join_all(fetches).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(version = %self.settings.version, error = %e, "Warm asset fetch failed, install aborted");
                self.mark_redundant();
                return Err(e.into());
            }
        };

        let cache = self.caches.open(&self.settings.version).await;
        for (request, response) in fetched {
            if let Err(e) = cache.put(&request, response).await {
                self.mark_redundant();
                return Err(e.into());
            }
        }

        if self.settings.skip_waiting {
            self.skip_waiting.store(true, Ordering::SeqCst);
        }
        self.transition(WorkerState::Installing, WorkerState::Installed, "install")?;
        info!(version = %self.settings.version, "Cache worker installed");
        Ok(())
    }

    /// Delete every namespace except this generation's, then claim pages.
    /// Returns the names of the deleted namespaces.
    pub async fn activate(&self) -> Result<Vec<String>, LifecycleError> {
        self.transition(WorkerState::Installed, WorkerState::Activating, "activate")?;

        let mut pruned = Vec::new();
        for name in self.caches.keys().await {
            if name != self.settings.version && self.caches.delete(&name).await {
                debug!(namespace = %name, "Deleted stale cache namespace");
                pruned.push(name);
            }
        }

        self.transition(WorkerState::Activating, WorkerState::Activated, "activate")?;
        self.claimed.store(true, Ordering::SeqCst);
        info!(version = %self.settings.version, pruned = pruned.len(), "Cache worker activated");
        Ok(pruned)
    }

    /// Bring back a generation activated by an earlier process. Only valid
    /// when its namespace survived in the restored storage.
    pub(crate) async fn restore(&self) -> Result<bool, LifecycleError> {
        if !self.caches.has(&self.settings.version).await {
            return Ok(false);
        }
        self.transition(WorkerState::Parsed, WorkerState::Activated, "restore")?;
        self.claimed.store(true, Ordering::SeqCst);
        debug!(version = %self.settings.version, "Cache worker restored from snapshot");
        Ok(true)
    }

    // ===== Fetch interception =====

    /// Network fetch that refreshes `cache` on a 200. Once the namespace has
    /// been pruned the handle is detached, so late writes land nowhere.
    fn revalidate(&self, request: Request, cache: Cache) -> impl Future<Output = Result<Response, FetchError>> + Send + 'static {
        let network = Arc::clone(&self.network);
        async move {
            let response = network.fetch(&request).await?;
            if response.status == 200 {
                if let Err(e) = cache.put(&request, response.clone()).await {
                    warn!(url = %request.url, error = %e, "Failed to store revalidated response");
                }
            }
            Ok(response)
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.revalidations.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Answer a page request.
    ///
    /// Errors are only returned for a cache miss whose network fetch failed
    /// and which is not a navigation with a cached root to fall back on.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, FetchError> {
        if self.state() != WorkerState::Activated {
            return Ok(FetchOutcome::Passthrough);
        }
        if self.exclusions.excludes(request) {
            debug!(method = %request.method, url = %request.url, "Request excluded from cache");
            return Ok(FetchOutcome::Passthrough);
        }

        // A newer generation may have pruned this namespace already.
        let Some(cache) = self.caches.get(&self.settings.version).await else {
            debug!(version = %self.settings.version, "Cache namespace gone, not intercepting");
            return Ok(FetchOutcome::Passthrough);
        };

        let request = self.normalize(request);
        let cached = cache.match_request(&request).await;
        let revalidation = self.revalidate(request.clone(), cache.clone());

        if let Some(response) = cached {
            let url = request.url.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = revalidation.await {
                    debug!(url = %url, error = %e, "Background revalidation failed");
                }
            });
            self.track(handle);
            return Ok(FetchOutcome::Respond {
                response,
                source: ResponseSource::Cache,
            });
        }

        match revalidation.await {
            Ok(response) => Ok(FetchOutcome::Respond {
                response,
                source: ResponseSource::Network,
            }),
            Err(e) if request.is_navigation() => {
                match cache.match_request(&Request::get(ROOT_DOCUMENT)).await {
                    Some(shell) => {
                        debug!(url = %request.url, "Offline navigation, serving root document");
                        Ok(FetchOutcome::Respond {
                            response: shell,
                            source: ResponseSource::OfflineShell,
                        })
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Wait for every background revalidation started so far.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = {
                let mut guard = self.revalidations.lock().unwrap_or_else(|e| e.into_inner());
                guard.drain(..).collect()
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Revalidation task panicked");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::testing::FakeNetwork;

    fn settings(warm: &[&str]) -> WorkerSettings {
        WorkerSettings {
            version: "v2".to_string(),
            warm_assets: warm.iter().map(|s| s.to_string()).collect(),
            origin: "https://arm-mali.org".to_string(),
            ..WorkerSettings::default()
        }
    }

    async fn active_worker(network: Arc<FakeNetwork>, warm: &[&str]) -> OfflineWorker<FakeNetwork> {
        let worker = OfflineWorker::new(settings(warm), network, CacheStorage::new());
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        worker
    }

    fn body(outcome: &FetchOutcome) -> String {
        match outcome {
            FetchOutcome::Respond { response, .. } => response.text(),
            FetchOutcome::Passthrough => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_install_warms_every_asset() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        network.serve("/app.js", "js");
        let worker = OfflineWorker::new(settings(&["/", "/app.js"]), network, CacheStorage::new());

        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);
        assert!(worker.skips_waiting());
        let cache = worker.caches().open("v2").await;
        assert_eq!(cache.keys().await, ["/", "/app.js"]);
    }

    #[tokio::test]
    async fn test_install_fails_whole_when_one_asset_missing() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        network.serve_status("/gone.css", 404, "");
        let worker = OfflineWorker::new(settings(&["/", "/gone.css"]), network, CacheStorage::new());

        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, LifecycleError::Install(FetchError::BadStatus { status: 404, .. })));
        assert_eq!(worker.state(), WorkerState::Redundant);
        assert!(!worker.caches().has("v2").await);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let worker = OfflineWorker::new(settings(&[]), Arc::new(FakeNetwork::new()), CacheStorage::new());
        let err = worker.activate().await.unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidState { action: "activate", state: WorkerState::Parsed }));
    }

    #[tokio::test]
    async fn test_activate_prunes_other_generations() {
        let caches = CacheStorage::new();
        caches.open("arm-v1").await;
        caches.open("arm-v2-beta").await;
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");

        let worker = OfflineWorker::new(settings(&["/"]), network, caches.clone());
        worker.install().await.unwrap();
        let pruned = worker.activate().await.unwrap();

        assert_eq!(pruned, ["arm-v1", "arm-v2-beta"]);
        assert_eq!(caches.keys().await, ["v2"]);
        assert!(worker.has_claimed());
    }

    #[tokio::test]
    async fn test_not_intercepting_before_activation() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        let worker = OfflineWorker::new(settings(&["/"]), network, CacheStorage::new());
        worker.install().await.unwrap();
        let outcome = worker.handle_fetch(&Request::get("/")).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Passthrough);
    }

    #[tokio::test]
    async fn test_excluded_requests_pass_through_untouched() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        let ai = "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent";
        network.serve(ai, "{}");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;
        let calls_before = network.calls();

        let post = Request::post("/");
        assert_eq!(worker.handle_fetch(&post).await.unwrap(), FetchOutcome::Passthrough);
        assert_eq!(worker.handle_fetch(&Request::get(ai)).await.unwrap(), FetchOutcome::Passthrough);
        worker.settle().await;

        assert_eq!(network.calls(), calls_before);
        assert!(worker.caches().match_request(&Request::get(ai)).await.is_none());
        assert!(worker.caches().match_request(&post).await.is_none());
    }

    #[tokio::test]
    async fn test_only_own_namespace_answers() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;

        let staging = worker.caches().open("v3-staging").await;
        staging.put(&Request::get("/programme"), Response::ok("foreign")).await.unwrap();

        network.go_offline();
        let result = worker.handle_fetch(&Request::get("/programme")).await;
        assert!(matches!(result, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_stale_while_revalidate() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/news.json", "old");
        let worker = active_worker(Arc::clone(&network), &["/news.json"]).await;

        network.serve("/news.json", "new");
        network.hold();
        let first = worker.handle_fetch(&Request::get("/news.json")).await.unwrap();
        assert_eq!(body(&first), "old");
        assert!(matches!(first, FetchOutcome::Respond { source: ResponseSource::Cache, .. }));

        network.release();
        worker.settle().await;
        let second = worker.handle_fetch(&Request::get("/news.json")).await.unwrap();
        assert_eq!(body(&second), "new");
    }

    #[tokio::test]
    async fn test_same_origin_urls_share_cache_entry() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;
        network.go_offline();

        let outcome = worker.handle_fetch(&Request::get("https://arm-mali.org")).await.unwrap();
        assert_eq!(body(&outcome), "root");
    }

    #[tokio::test]
    async fn test_failed_revalidation_keeps_cached_copy() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;

        network.go_offline();
        let outcome = worker.handle_fetch(&Request::get("/")).await.unwrap();
        assert_eq!(body(&outcome), "root");
        worker.settle().await;

        network.go_online();
        network.serve_status("/", 500, "boom");
        worker.handle_fetch(&Request::get("/")).await.unwrap();
        worker.settle().await;
        let outcome = worker.handle_fetch(&Request::get("/")).await.unwrap();
        assert_eq!(body(&outcome), "root");
    }

    #[tokio::test]
    async fn test_miss_goes_to_network_and_is_stored() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        network.serve("/statuts.html", "statuts");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;

        let outcome = worker.handle_fetch(&Request::get("/statuts.html")).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Respond { source: ResponseSource::Network, .. }));

        network.go_offline();
        let outcome = worker.handle_fetch(&Request::get("/statuts.html")).await.unwrap();
        assert_eq!(body(&outcome), "statuts");
    }

    #[tokio::test]
    async fn test_non_ok_miss_is_returned_but_not_stored() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        network.serve_status("/missing", 404, "not found");
        let worker = active_worker(Arc::clone(&network), &["/"]).await;

        match worker.handle_fetch(&Request::get("/missing")).await.unwrap() {
            FetchOutcome::Respond { response, .. } => assert_eq!(response.status, 404),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(worker.caches().match_request(&Request::get("/missing")).await.is_none());
    }

    #[tokio::test]
    async fn test_offline_miss_surfaces_error_or_shell() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/", "root");
        network.serve("/index.html", "index");
        let worker = active_worker(Arc::clone(&network), &["/", "/index.html"]).await;
        network.go_offline();

        let warmed = worker.handle_fetch(&Request::get("/index.html")).await.unwrap();
        assert_eq!(body(&warmed), "index");

        let err = worker.handle_fetch(&Request::get("/media.mp4")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));

        let shell = worker.handle_fetch(&Request::navigate("/programme")).await.unwrap();
        assert!(matches!(shell, FetchOutcome::Respond { source: ResponseSource::OfflineShell, .. }));
        assert_eq!(body(&shell), "root");
    }

    #[tokio::test]
    async fn test_offline_navigation_without_root_surfaces_error() {
        let network = Arc::new(FakeNetwork::new());
        network.serve("/index.html", "index");
        let worker = active_worker(Arc::clone(&network), &["/index.html"]).await;
        network.go_offline();

        let err = worker.handle_fetch(&Request::navigate("/programme")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
