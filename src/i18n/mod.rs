//! Internationalization (i18n) module for the marketplace UI.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported UI languages
//! - `language`: Validated `Language` type
//! - `preference`: The selected display language, persisted and observable
//! - `filter`: Detects strings with nothing to translate
//! - `metrics`: Translation counters
//!
//! # Example
//!
//! ```rust,ignore
//! use marketplace_i18n::i18n::{Language, LanguagePreference};
//!
//! let preference = LanguagePreference::load("lang.json", Language::canonical());
//! preference.set(Language::from_code("hi")?)?;
//! ```

mod filter;
mod language;
mod metrics;
mod preference;
mod registry;

pub use filter::needs_translation;
pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use preference::{LanguagePreference, PreferenceError};
pub use registry::{LanguageConfig, LanguageRegistry};
