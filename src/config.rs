use crate::i18n::Language;
use anyhow::{Context, Result};
use std::time::Duration;

/// Google Translate v2 endpoint.
pub const DEFAULT_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone)]
pub struct Config {
    // Translation API
    pub api_key: String,
    pub api_url: String,
    pub request_timeout: Duration,
    pub max_attempts: u32,

    // Batching
    pub max_batch_items: usize,
    pub batch_window: Duration,

    // Per-node debounce
    pub debounce: Duration,

    // Language preference
    pub default_language: Language,
    pub preference_file: Option<String>,
}

impl Config {
    /// Config with default tuning for the given key and endpoint.
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
            request_timeout: Duration::from_secs(10),
            max_attempts: 1,
            max_batch_items: 100,
            batch_window: Duration::from_millis(10),
            debounce: Duration::from_millis(100),
            default_language: Language::canonical(),
            preference_file: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code).context("Invalid DEFAULT_LANGUAGE")?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            // Translation API
            api_key: std::env::var("GOOGLE_TRANSLATE_API_KEY")
                .context("GOOGLE_TRANSLATE_API_KEY not set")?,
            api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(env_or("TRANSLATE_TIMEOUT_SECS", 10)),
            max_attempts: env_or("TRANSLATE_MAX_ATTEMPTS", 1_u32).max(1),

            // Batching - Google accepts up to 128 segments per call
            max_batch_items: env_or("TRANSLATE_MAX_BATCH_ITEMS", 100_usize).clamp(1, 128),
            batch_window: Duration::from_millis(env_or("TRANSLATE_BATCH_WINDOW_MS", 10)),

            debounce: Duration::from_millis(env_or("TRANSLATE_DEBOUNCE_MS", 100)),

            default_language,
            preference_file: std::env::var("LANGUAGE_PREFERENCE_FILE").ok(),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default`.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
