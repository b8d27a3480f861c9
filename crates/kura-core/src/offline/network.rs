use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::FetchError;
use super::request::{Request, Response};

/// HTTP request timeout in seconds.
/// Bounds a hung revalidation; the cached copy has already been served.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The network boundary the offline worker sits on.
///
/// Any HTTP status is a successful fetch; only transport failures are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Resolve a same-origin path against `origin`; absolute URLs pass through.
pub fn resolve_url(origin: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", origin.trim_end_matches('/'), url)
    }
}

/// Network access through reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: String,
}

impl HttpNetwork {
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            origin: origin.into(),
        })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = resolve_url(&self.origin, &request.url);
        let network_error = |e: reqwest::Error| FetchError::Network {
            url: url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .request(request.method.clone(), &url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(network_error)?.to_vec();

        debug!(url = %url, status, bytes = body.len(), "Fetched");
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
