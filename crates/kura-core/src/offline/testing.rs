//! Deterministic network double for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use super::error::FetchError;
use super::network::Network;
use super::request::{Request, Response};

pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: AtomicUsize,
    gate: watch::Sender<bool>,
}

impl FakeNetwork {
    pub(crate) fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            routes: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            gate,
        }
    }

    pub(crate) fn serve(&self, url: &str, body: &str) {
        self.serve_status(url, 200, body);
    }

    pub(crate) fn serve_status(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Response::new(status, body.as_bytes().to_vec()));
    }

    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Block every fetch until `release`.
    pub(crate) fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub(crate) fn release(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network {
                url: request.url.clone(),
                reason: "offline".to_string(),
            });
        }
        let route = self.routes.lock().unwrap().get(&request.url).cloned();
        match route {
            Some(response) => Ok(response),
            None => Err(FetchError::Network {
                url: request.url.clone(),
                reason: "no route".to_string(),
            }),
        }
    }
}
