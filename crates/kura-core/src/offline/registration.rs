use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::error::{FetchError, LifecycleError};
use super::network::Network;
use super::request::Request;
use super::worker::{FetchOutcome, OfflineWorker};

/// Tracks the worker generation controlling the page.
///
/// A new generation keeps the previous one serving until it has installed
/// and activated; fetches already running on the previous generation finish
/// there.
pub struct Registration<N: Network + 'static> {
    active: RwLock<Option<Arc<OfflineWorker<N>>>>,
    waiting: RwLock<Option<Arc<OfflineWorker<N>>>>,
}

impl<N: Network + 'static> Default for Registration<N> {
    fn default() -> Self {
        Self {
            active: RwLock::new(None),
            waiting: RwLock::new(None),
        }
    }
}

impl<N: Network + 'static> Registration<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active(&self) -> Option<Arc<OfflineWorker<N>>> {
        self.active.read().await.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<OfflineWorker<N>>> {
        self.waiting.read().await.clone()
    }

    /// Install a new generation. When it skips waiting it is activated and
    /// takes over immediately; otherwise it waits for `promote_waiting`.
    /// On install failure the current generation stays in control.
    pub async fn register(&self, worker: OfflineWorker<N>) -> Result<Arc<OfflineWorker<N>>, LifecycleError> {
        let worker = Arc::new(worker);
        worker.install().await?;

        if worker.skips_waiting() {
            self.take_over(Arc::clone(&worker)).await?;
        } else {
            info!(version = %worker.version(), "Cache worker waiting");
            if let Some(previous) = self.waiting.write().await.replace(Arc::clone(&worker)) {
                previous.mark_redundant();
            }
        }
        Ok(worker)
    }

    /// Put a previously activated generation back in control without
    /// installing it again. Returns `None` when its namespace is missing,
    /// in which case the worker must go through `register`.
    pub async fn resume(&self, worker: OfflineWorker<N>) -> Result<Option<Arc<OfflineWorker<N>>>, LifecycleError> {
        if !worker.restore().await? {
            return Ok(None);
        }
        let worker = Arc::new(worker);
        if let Some(previous) = self.active.write().await.replace(Arc::clone(&worker)) {
            previous.mark_redundant();
        }
        Ok(Some(worker))
    }

    /// Activate the waiting generation, if any.
    pub async fn promote_waiting(&self) -> Result<bool, LifecycleError> {
        let Some(worker) = self.waiting.write().await.take() else {
            return Ok(false);
        };
        self.take_over(worker).await?;
        Ok(true)
    }

    async fn take_over(&self, worker: Arc<OfflineWorker<N>>) -> Result<(), LifecycleError> {
        worker.activate().await?;
        let previous = self.active.write().await.replace(worker);
        if let Some(previous) = previous {
            info!(version = %previous.version(), "Previous cache worker superseded");
            previous.mark_redundant();
        }
        Ok(())
    }

    /// Route a page request through the controlling generation.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, FetchError> {
        match self.active().await {
            Some(worker) => worker.handle_fetch(request).await,
            None => Ok(FetchOutcome::Passthrough),
        }
    }

    pub async fn settle(&self) {
        if let Some(worker) = self.active().await {
            worker.settle().await;
        }
    }
}
