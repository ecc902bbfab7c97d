//! Language registry: Single source of truth for all supported UI languages.
//!
//! The marketplace UI is authored in English and can be displayed in Hindi or
//! Marathi. The registry is built once behind a `OnceLock` and is immutable
//! afterwards.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code, also the code sent to the translation API
    pub code: &'static str,

    /// English name of the language (e.g., "Hindi")
    pub name: &'static str,

    /// Native name of the language, as shown in the language picker
    pub native_name: &'static str,

    /// Whether UI strings are authored in this language (only one should be true)
    pub is_canonical: bool,
}

/// Fallback used when the table has no canonical entry.
const ENGLISH: LanguageConfig = LanguageConfig {
    code: "en",
    name: "English",
    native_name: "English",
    is_canonical: true,
};

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// Codes are matched case-insensitively, so `"HI"` and `"hi"` resolve to
    /// the same entry.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
    }

    /// All supported languages, in picker order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Get the canonical language configuration.
    ///
    /// This is the language UI string literals are written in.
    pub fn canonical(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_canonical)
            .unwrap_or(&ENGLISH)
    }
}

/// Default language configurations: English (canonical), Hindi and Marathi.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        ENGLISH,
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            is_canonical: false,
                },
        LanguageConfig {
            code: "mr",
            name: "Marathi",
            native_name: "मराठी",
            is_canonical: false,
                },
    ]
}
