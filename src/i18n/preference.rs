//! The user's selected display language.
//!
//! `LanguagePreference` is a cheap-to-clone handle: every clone observes the
//! same value and change notifications are delivered through a
//! `tokio::sync::watch` channel. When a file path is configured the value is
//! read at startup and written back on every change.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Errors raised while persisting the preference.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write language preference to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode language preference: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk representation.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    language: Language,
}

#[derive(Debug)]
struct Inner {
    sender: watch::Sender<Language>,
    path: Option<PathBuf>,
}

/// Shared, observable language selection.
#[derive(Debug, Clone)]
pub struct LanguagePreference {
    inner: Arc<Inner>,
}

impl LanguagePreference {
    /// In-memory preference starting at `initial`.
    pub fn new(initial: Language) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner { sender, path: None }),
        }
    }

    /// Load the preference stored at `path`.
    ///
    /// A missing or unreadable file yields `default`; later changes are
    /// written to `path` either way.
    pub fn load(path: impl Into<PathBuf>, default: Language) -> Self {
        let path = path.into();
        let initial = match read_stored(&path) {
            Some(language) => {
                debug!("Loaded language preference '{}' from {}", language, path.display());
                language
            }
            None => default,
        };

        let (sender, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                sender,
                path: Some(path),
            }),
        }
    }

    /// Currently selected language.
    pub fn current(&self) -> Language {
        *self.inner.sender.borrow()
    }

    /// Select a new language.
    ///
    /// Subscribers are only notified when the value actually changes. The
    /// in-memory value is updated even if persisting it fails.
    pub fn set(&self, language: Language) -> Result<(), PreferenceError> {
        let changed = self.inner.sender.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });

        if !changed {
            return Ok(());
        }

        debug!("Language preference changed to '{}'", language);
        match &self.inner.path {
            Some(path) => write_stored(path, language),
            None => Ok(()),
        }
    }

    /// Receive every future change of the selected language.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.inner.sender.subscribe()
    }

    /// File the preference is persisted to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

impl Default for LanguagePreference {
    fn default() -> Self {
        Self::new(Language::canonical())
    }
}

fn read_stored(path: &Path) -> Option<Language> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<StoredPreference>(&content) {
        Ok(stored) => Some(stored.language),
        Err(e) => {
            warn!(
                "Ignoring invalid language preference file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

fn write_stored(path: &Path, language: Language) -> Result<(), PreferenceError> {
    let json = serde_json::to_string_pretty(&StoredPreference { language })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, json).map_err(|source| PreferenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
