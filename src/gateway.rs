//! Google Translate v2 client with a fail-open contract.
//!
//! `translate_batch` never returns an error: any network failure, non-success
//! status or malformed body is logged, counted, and answered with the
//! original strings in their original order.

use crate::config::Config;
use crate::i18n::{Language, TranslationMetrics};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a translation call produced no usable result.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request could not be sent, or timed out.
    #[error("translation request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("translation API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The API answered 2xx but the body was unusable.
    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Network errors, 429 and 5xx are transient; other 4xx (bad key,
    /// exhausted quota) and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Upstream { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Malformed(_) => false,
        }
    }
}

/// Request body for `POST /language/translate/v2`.
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'static str,
    source: &'static str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Split `texts` into distinct values (first-seen order) and, for every
/// input position, the index of its value in that list.
pub fn dedupe_preserving_order<S: AsRef<str>>(texts: &[S]) -> (Vec<String>, Vec<usize>) {
    let mut unique: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut indices = Vec::with_capacity(texts.len());

    for text in texts {
        let text = text.as_ref();
        let index = *positions.entry(text).or_insert_with(|| {
            unique.push(text.to_string());
            unique.len() - 1
        });
        indices.push(index);
    }

    (unique, indices)
}

/// Batched client for the remote translation API.
#[derive(Debug, Clone)]
pub struct TranslationGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    max_batch_items: usize,
    retry: RetryConfig,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationGateway {
    pub fn new(config: &Config, metrics: Arc<TranslationMetrics>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client for the translation API")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            max_batch_items: config.max_batch_items.max(1),
            retry: RetryConfig::translation_api(config.max_attempts),
            metrics,
        })
    }

    pub fn max_batch_items(&self) -> usize {
        self.max_batch_items
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        &self.metrics
    }

    /// Translate `texts`, returning a list of the same length and order.
    ///
    /// Repeated strings are sent once. Items whose call failed come back
    /// unchanged.
    pub async fn translate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        source: Language,
        target: Language,
    ) -> Vec<String> {
        let (unique, indices) = dedupe_preserving_order(texts);
        let outcomes = self.translate_unique(&unique, source, target).await;

        indices
            .into_iter()
            .map(|i| match outcomes.get(i) {
                Some(Some(translated)) => translated.clone(),
                _ => unique.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Translate distinct strings, reporting per item whether it succeeded.
    ///
    /// Input is split into chunks of at most `max_batch_items`, one HTTP call
    /// per chunk, sent concurrently. `None` marks an item whose chunk failed;
    /// such items must not be cached.
    pub async fn translate_unique(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Vec<Option<String>> {
        if texts.is_empty() {
            return Vec::new();
        }
        if source == target {
            return texts.iter().cloned().map(Some).collect();
        }

        let chunks = texts.chunks(self.max_batch_items);
        let results = join_all(chunks.map(|chunk| async move {
            match self.call(chunk, source, target).await {
                Ok(translated) => translated.into_iter().map(Some).collect::<Vec<_>>(),
                Err(e) => {
                    self.metrics.record_api_failure();
                    warn!(
                        "Translation {} -> {} failed for {} texts, showing original text: {}",
                        source,
                        target,
                        chunk.len(),
                        e
                    );
                    vec![None; chunk.len()]
                }
            }
        }))
        .await;

        results.into_iter().flatten().collect()
    }

    /// One API call (with retries for transient failures) for a single chunk.
    async fn call(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>, GatewayError> {
        let request = TranslateRequest {
            q: texts,
            target: target.code(),
            source: source.code(),
            format: "text",
        };

        with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", source, target),
            || self.send_once(&request),
            GatewayError::is_retryable,
        )
        .await
    }

    async fn send_once(&self, request: &TranslateRequest<'_>) -> Result<Vec<String>, GatewayError> {
        self.metrics.record_api_call();
        debug!(
            "Requesting {} translations {} -> {}",
            request.q.len(),
            request.source,
            request.target
        );

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        parse_translations(&body, request.q.len())
    }
}

/// Extract `error.message` from an error body, falling back to the raw text.
fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

fn parse_translations(body: &str, expected: usize) -> Result<Vec<String>, GatewayError> {
    let parsed: TranslateResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    let translations = parsed.data.translations;
    if translations.len() != expected {
        return Err(GatewayError::Malformed(format!(
            "expected {} translations, got {}",
            expected,
            translations.len()
        )));
    }

    Ok(translations
        .into_iter()
        .map(|t| t.translated_text)
        .collect())
}
