//! Process-scoped translation memo store.
//!
//! Entries are keyed by (text, source, target) and never evicted; the store
//! only shrinks on an explicit [`TranslationCache::clear`]. Cloning a
//! `TranslationCache` shares the underlying map, while `new()` always creates
//! an isolated one.

use crate::i18n::Language;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Identity of a translation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslationKey {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

/// Shared map from [`TranslationKey`] to translated text.
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    entries: Arc<RwLock<HashMap<TranslationKey, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a translation. Never waits on network I/O.
    pub fn get(&self, key: &TranslationKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a translation. Last write for a key wins.
    pub fn put(&self, key: TranslationKey, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.into());
    }

    pub fn contains(&self, key: &TranslationKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> TranslationKey {
        TranslationKey::new(text, Language::ENGLISH, Language::HINDI)
    }

    #[test]
    fn test_get_missing_returns_none() {
        let cache = TranslationCache::new();
        assert!(cache.get(&key("Plumber")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let cache = TranslationCache::new();
        cache.put(key("Plumber"), "प्लंबर");

        assert_eq!(cache.get(&key("Plumber")).as_deref(), Some("प्लंबर"));
        assert!(cache.contains(&key("Plumber")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_includes_both_languages() {
        let cache = TranslationCache::new();
        cache.put(key("Plumber"), "प्लंबर");

        let marathi = TranslationKey::new("Plumber", Language::ENGLISH, Language::MARATHI);
        let reversed = TranslationKey::new("Plumber", Language::HINDI, Language::ENGLISH);
        assert!(cache.get(&marathi).is_none());
        assert!(cache.get(&reversed).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = TranslationCache::new();
        cache.put(key("Home"), "first");
        cache.put(key("Home"), "second");

        assert_eq!(cache.get(&key("Home")).as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = TranslationCache::new();
        let clone = cache.clone();

        clone.put(key("Vendors"), "विक्रेता");
        assert!(cache.contains(&key("Vendors")));
    }

    #[test]
    fn test_new_caches_are_isolated() {
        let first = TranslationCache::new();
        let second = TranslationCache::new();

        first.put(key("Banner"), "बैनर");
        assert!(second.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = TranslationCache::new();
        cache.put(key("A"), "a");
        cache.put(key("B"), "b");

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = TranslationCache::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        cache.put(key(&format!("text-{}", j)), format!("writer-{}", i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert_eq!(cache.len(), 50);
    }
}
