//! Language type: validated language representation.
//!
//! A `Language` can only be built from a code the registry knows, so the rest of the crate never deals with arbitrary strings.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "hi")
    code: &'static str,
}

impl Language {
    /// English, the language UI strings are authored in.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Hindi.
    pub const HINDI: Language = Language { code: "hi" };

    /// Marathi.
    pub const MARATHI: Language = Language { code: "mr" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err` if the code is not found
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the canonical (source) language.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    pub fn config(&self) -> &'static LanguageConfig {
        let registry = LanguageRegistry::get();
        registry
            .get_by_code(self.code)
            .unwrap_or_else(|| registry.canonical())
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language (e.g., "मराठी").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the language UI strings are authored in.
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

// The code is re-interned from the registry, so any borrowed input works.
impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_english_constant() {
        let english = Language::ENGLISH;
        assert_eq!(english.code(), "en");
        assert_eq!(english.name(), "English");
        assert!(english.is_canonical());
    }

    #[test]
    fn test_hindi_constant() {
        let hindi = Language::HINDI;
        assert_eq!(hindi.code(), "hi");
        assert_eq!(hindi.name(), "Hindi");
        assert!(!hindi.is_canonical());
    }

    #[test]
    fn test_marathi_constant() {
        assert_eq!(Language::MARATHI.code(), "mr");
        assert_eq!(Language::MARATHI.native_name(), "मराठी");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_matches_constants() {
        assert_eq!(Language::from_code("en").ok(), Some(Language::ENGLISH));
        assert_eq!(Language::from_code("hi").ok(), Some(Language::HINDI));
        assert_eq!(Language::from_code("mr").ok(), Some(Language::MARATHI));
    }

    #[test]
    fn test_from_code_uppercase() {
        assert_eq!(Language::from_code("MR").ok(), Some(Language::MARATHI));
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_parse_via_from_str() {
        let language: Language = "hi".parse().expect("Should parse");
        assert_eq!(language, Language::HINDI);
    }

    // ==================== Default / Display Tests ====================

    #[test]
    fn test_default_is_canonical_english() {
        assert_eq!(Language::default(), Language::ENGLISH);
        assert_eq!(Language::canonical(), Language::ENGLISH);
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::MARATHI.to_string(), "mr");
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&Language::HINDI).expect("Should serialize");
        assert_eq!(json, "\"hi\"");
    }

    #[test]
    fn test_deserialize_rejects_unknown_code() {
        let result: Result<Language, _> = serde_json::from_str("\"xx\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_inside_owned_struct() {
        #[derive(Debug, Deserialize)]
        struct Stored {
            language: Language,
        }

        let json = String::from(r#"{"language": "hi"}"#);
        let stored: Stored = serde_json::from_str(&json).expect("Should deserialize");
        drop(json);
        assert_eq!(stored.language, Language::HINDI);
    }

    #[test]
    fn test_deserialize_known_code() {
        let language: Language = serde_json::from_str("\"mr\"").expect("Should deserialize");
        assert_eq!(language, Language::MARATHI);
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_language_usable_as_hash_key() {
        let mut set = std::collections::HashSet::new();
        set.insert(Language::HINDI);
        set.insert(Language::from_code("hi").unwrap());
        assert_eq!(set.len(), 1);
    }
}
