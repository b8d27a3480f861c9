//! Client for the hosted generative-AI API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the Generative Language API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// HTTP request timeout in seconds.
/// Generation can take a while for long prompts.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// The opaque text-generation capability. No retry is performed.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated. Empty when the model
    /// returned nothing.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

/// Generative Language API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", API_BASE_URL, self.model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
        let url = self.endpoint();

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system_instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send generation request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse generation response")?;
        let text = parsed.text();
        debug!(model = %self.model, chars = text.chars().count(), "Generation complete");
        Ok(text)
    }
}
