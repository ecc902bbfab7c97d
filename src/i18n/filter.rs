//! Heuristics for strings that have nothing to translate.
//!
//! Text without a single letter of its source script (prices, phone numbers,
//! or Devanagari inside English-sourced UI text) is displayed as-is. URLs
//! and e-mail addresses are never sent to the API either.

use crate::i18n::Language;
use regex::Regex;
use std::sync::OnceLock;

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"(?i)^(https?://|www\.)\S+$").expect("URL pattern is a valid regex")
    })
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("e-mail pattern is a valid regex")
    })
}

/// Whether `text`, written in `source`, should be sent to the translation
/// API at all.
///
/// English text needs at least one Latin letter; other sources need any
/// letter at all.
pub fn needs_translation(text: &str, source: Language) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    let has_letter = if source.is_canonical() {
        trimmed.chars().any(|c| c.is_ascii_alphabetic())
    } else {
        trimmed.chars().any(char::is_alphabetic)
    };
    if !has_letter {
        return false;
    }

    !(url_regex().is_match(trimmed) || email_regex().is_match(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_needs_translation() {
        assert!(needs_translation("Plumbers near you", Language::ENGLISH));
        assert!(needs_translation("  Home Cleaning  ", Language::ENGLISH));
    }

    #[test]
    fn test_blank_does_not() {
        assert!(!needs_translation("", Language::ENGLISH));
        assert!(!needs_translation("   \n\t", Language::ENGLISH));
    }

    #[test]
    fn test_numbers_and_punctuation_do_not() {
        assert!(!needs_translation("12345", Language::ENGLISH));
        assert!(!needs_translation("₹ 1,499.00", Language::ENGLISH));
        assert!(!needs_translation("+91 98765-43210", Language::ENGLISH));
        assert!(!needs_translation("--", Language::ENGLISH));
    }

    #[test]
    fn test_devanagari_in_english_source_does_not() {
        assert!(!needs_translation("नमस्ते", Language::ENGLISH));
        assert!(!needs_translation("सुतार ४", Language::ENGLISH));
    }

    #[test]
    fn test_urls_do_not() {
        assert!(!needs_translation("https://example.com/vendors?id=4", Language::ENGLISH));
        assert!(!needs_translation("www.example.in", Language::ENGLISH));
        assert!(!needs_translation("HTTP://EXAMPLE.COM", Language::ENGLISH));
    }

    #[test]
    fn test_emails_do_not() {
        assert!(!needs_translation("support@example.com", Language::ENGLISH));
    }

    #[test]
    fn test_sentence_mentioning_url_still_needs_translation() {
        assert!(needs_translation("Visit https://example.com for offers", Language::ENGLISH));
    }

    #[test]
    fn test_devanagari_source_needs_translation() {
        assert!(needs_translation("नमस्ते", Language::HINDI));
        assert!(needs_translation("सुतार ४", Language::MARATHI));
    }

    #[test]
    fn test_non_english_source_still_skips_numbers_and_links() {
        assert!(!needs_translation("९८७६५ ४३२१०", Language::HINDI));
        assert!(!needs_translation("₹ 499", Language::MARATHI));
        assert!(!needs_translation("https://example.com", Language::HINDI));
        assert!(!needs_translation("   ", Language::HINDI));
    }

    #[test]
    fn test_mixed_alphanumeric_needs_translation() {
        assert!(needs_translation("24x7 service", Language::ENGLISH));
    }
}
