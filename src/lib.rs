//! Cached, coalescing translation of marketplace UI strings.
//!
//! UI text is authored in English and displayed in the user's selected
//! language (Hindi, Marathi) via the Google Translate v2 API. Translation is
//! an enhancement: every failure degrades to showing the original text.
//!
//! - [`cache`]: process-scoped memo of finished translations
//! - [`gateway`]: batched HTTP client with a fail-open contract
//! - [`batcher`]: coalesces concurrent misses into shared calls
//! - [`orchestrator`]: per-displayed-text state machine
//! - [`fields`]: translation of named fields across record lists

pub mod batcher;
pub mod cache;
pub mod config;
pub mod fields;
pub mod gateway;
pub mod i18n;
pub mod orchestrator;
pub mod retry;

pub use batcher::TranslationBatcher;
pub use cache::{TranslationCache, TranslationKey};
pub use fields::ObjectFieldTranslator;
pub use gateway::{GatewayError, TranslationGateway};
pub use i18n::{Language, LanguagePreference};
pub use orchestrator::{Phase, Rendered, TranslatedText, TranslationOrchestrator};
