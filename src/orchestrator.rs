//! Per-displayed-text translation state.
//!
//! Every piece of UI text is mounted as a [`TranslatedText`] node. A node
//! shows its source text immediately, serves cache hits synchronously, and on
//! a miss schedules a debounced lookup through the shared batcher. Changing
//! the node's text, skip flag or target language restarts that lookup.
//!
//! Each scheduled lookup is tagged with the node generation and the key it
//! was issued for. The completion handler drops the result when the node was
//! unmounted, the generation moved on, or the live key no longer matches, so
//! a slow response can never overwrite a newer display state.

use crate::batcher::TranslationBatcher;
use crate::cache::{TranslationCache, TranslationKey};
use crate::config::Config;
use crate::fields::ObjectFieldTranslator;
use crate::gateway::TranslationGateway;
use crate::i18n::{needs_translation, Language, LanguagePreference, TranslationMetrics};
use anyhow::Result;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

/// Where a node is in its translation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to translate; the source text is shown verbatim.
    Skip,
    /// The translation was already cached.
    CacheHit,
    /// Waiting on the debounce timer or the network.
    Pending,
    /// The lookup finished (with a translation or the fallback text).
    Resolved,
    /// The node was destroyed; it never changes again.
    Unmounted,
}

/// What a node currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub loading: bool,
    pub phase: Phase,
}

#[derive(Debug)]
struct NodeState {
    text: String,
    source: Language,
    target: Language,
    skip: bool,
    generation: u64,
    unmounted: bool,
    pending: Option<JoinHandle<()>>,
}

impl NodeState {
    fn key(&self) -> TranslationKey {
        TranslationKey::new(self.text.clone(), self.source, self.target)
    }

    fn should_skip(&self) -> bool {
        self.skip || self.source == self.target || !needs_translation(&self.text, self.source)
    }
}

#[derive(Debug)]
struct NodeShared {
    batcher: TranslationBatcher,
    debounce: Duration,
    state: Mutex<NodeState>,
    display: watch::Sender<Rendered>,
}

impl NodeShared {
    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and recompute the display if it reports a difference.
    fn update(self: &Arc<Self>, change: impl FnOnce(&mut NodeState) -> bool) {
        let mut state = self.lock();
        if state.unmounted {
            return;
        }
        if change(&mut state) {
            self.recompute(&mut state);
        }
    }

    fn recompute(self: &Arc<Self>, state: &mut NodeState) {
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let rendered = if state.should_skip() {
            Rendered {
                text: state.text.clone(),
                loading: false,
                phase: Phase::Skip,
            }
        } else {
            let key = state.key();
            match self.batcher.cache().get(&key) {
                Some(hit) => {
                    self.batcher.metrics().record_cache_hit();
                    Rendered {
                        text: hit,
                        loading: false,
                        phase: Phase::CacheHit,
                    }
                }
                None => {
                    state.pending = Some(self.schedule(key, state.generation));
                    Rendered {
                        text: state.text.clone(),
                        loading: true,
                        phase: Phase::Pending,
                    }
                }
            }
        };

        self.display.send_replace(rendered);
    }

    fn schedule(self: &Arc<Self>, key: TranslationKey, generation: u64) -> JoinHandle<()> {
        let node = Arc::clone(self);
        tokio::spawn(async move {
            sleep(node.debounce).await;
            let translated = node
                .batcher
                .request(key.text.clone(), key.source, key.target)
                .await;
            node.resolve(generation, &key, translated);
        })
    }

    fn resolve(&self, generation: u64, key: &TranslationKey, translated: String) {
        let mut state = self.lock();
        if state.unmounted || state.generation != generation || state.key() != *key {
            debug!(
                "Dropping stale translation of {:?} ({} -> {})",
                key.text, key.source, key.target
            );
            return;
        }

        state.pending = None;
        self.display.send_replace(Rendered {
            text: translated,
            loading: false,
            phase: Phase::Resolved,
        });
    }

    fn unmount(&self) {
        let mut state = self.lock();
        if state.unmounted {
            return;
        }
        state.unmounted = true;
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        self.display.send_modify(|rendered| {
            rendered.loading = false;
            rendered.phase = Phase::Unmounted;
        });
    }
}

/// A mounted piece of UI text.
///
/// Follows the orchestrator's language preference until unmounted. Dropping
/// the node unmounts it.
#[derive(Debug)]
pub struct TranslatedText {
    shared: Arc<NodeShared>,
    watcher: JoinHandle<()>,
}

impl TranslatedText {
    /// What the node displays right now.
    pub fn rendered(&self) -> Rendered {
        self.shared.display.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.shared.display.borrow().text.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.display.borrow().loading
    }

    pub fn phase(&self) -> Phase {
        self.shared.display.borrow().phase
    }

    /// Receive every display change.
    pub fn subscribe(&self) -> watch::Receiver<Rendered> {
        self.shared.display.subscribe()
    }

    /// Wait until the node is no longer loading.
    pub async fn settled(&self) -> Rendered {
        let mut receiver = self.subscribe();
        let settled = receiver.wait_for(|rendered| !rendered.loading).await;
        match settled {
            Ok(rendered) => rendered.clone(),
            Err(_) => self.rendered(),
        }
    }

    /// Replace the source text.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.update(|state| {
            if state.text == text {
                return false;
            }
            state.text = text;
            true
        });
    }

    /// Toggle the skip flag.
    pub fn set_skip(&self, skip: bool) {
        self.shared.update(|state| {
            if state.skip == skip {
                return false;
            }
            state.skip = skip;
            true
        });
    }

    /// Switch the target language for this node only.
    pub fn retarget(&self, target: Language) {
        retarget(&self.shared, target);
    }

    /// Destroy the node: cancels its timer and ignores any in-flight result.
    pub fn unmount(&self) {
        self.watcher.abort();
        self.shared.unmount();
    }
}

impl Drop for TranslatedText {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn retarget(shared: &Arc<NodeShared>, target: Language) {
    shared.update(|state| {
        if state.target == target {
            return false;
        }
        state.target = target;
        true
    });
}

/// Entry point for UI consumers.
#[derive(Debug, Clone)]
pub struct TranslationOrchestrator {
    batcher: TranslationBatcher,
    preference: LanguagePreference,
    debounce: Duration,
}

impl TranslationOrchestrator {
    pub fn new(batcher: TranslationBatcher, preference: LanguagePreference, debounce: Duration) -> Self {
        Self {
            batcher,
            preference,
            debounce,
        }
    }

    /// Build the full stack (metrics, gateway, cache, batcher, preference).
    pub fn from_config(config: &Config) -> Result<Self> {
        let metrics = Arc::new(TranslationMetrics::new());
        let gateway = TranslationGateway::new(config, metrics)?;
        let batcher = TranslationBatcher::new(gateway, TranslationCache::new(), config.batch_window);

        let preference = match &config.preference_file {
            Some(path) => LanguagePreference::load(path, config.default_language),
            None => LanguagePreference::new(config.default_language),
        };

        info!(
            "Translation orchestrator ready (language: {}, batch size: {}, debounce: {:?})",
            preference.current(),
            config.max_batch_items,
            config.debounce
        );

        Ok(Self::new(batcher, preference, config.debounce))
    }

    pub fn cache(&self) -> &TranslationCache {
        self.batcher.cache()
    }

    pub fn batcher(&self) -> &TranslationBatcher {
        &self.batcher
    }

    pub fn preference(&self) -> &LanguagePreference {
        &self.preference
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        self.batcher.metrics()
    }

    /// Mount a text node that follows the language preference.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn mount(&self, text: impl Into<String>, source: Language, skip: bool) -> TranslatedText {
        let mut preference = self.preference.subscribe();
        let target = *preference.borrow_and_update();

        let text = text.into();
        let (display, _) = watch::channel(Rendered {
            text: text.clone(),
            loading: false,
            phase: Phase::Skip,
        });

        let shared = Arc::new(NodeShared {
            batcher: self.batcher.clone(),
            debounce: self.debounce,
            state: Mutex::new(NodeState {
                text,
                source,
                target,
                skip,
                generation: 0,
                unmounted: false,
                pending: None,
            }),
            display,
        });

        {
            let mut state = shared.lock();
            shared.recompute(&mut state);
        }

        let node: Weak<NodeShared> = Arc::downgrade(&shared);
        let watcher = tokio::spawn(async move {
            while preference.changed().await.is_ok() {
                let target = *preference.borrow_and_update();
                match node.upgrade() {
                    Some(shared) => retarget(&shared, target),
                    None => break,
                }
            }
        });

        TranslatedText { shared, watcher }
    }

    /// One-shot translation into the currently selected language.
    pub async fn translate(&self, text: &str, source: Language) -> String {
        let target = self.preference.current();
        if source == target || !needs_translation(text, source) {
            return text.to_string();
        }
        self.batcher.request(text, source, target).await
    }

    /// One-shot translation of several strings, coalesced into shared batches.
    pub async fn translate_many<S: AsRef<str>>(&self, texts: &[S], source: Language) -> Vec<String> {
        join_all(texts.iter().map(|text| self.translate(text.as_ref(), source))).await
    }

    pub fn field_translator(&self) -> ObjectFieldTranslator {
        ObjectFieldTranslator::new(self.batcher.clone())
    }

    /// Translate named fields of JSON records into the selected language.
    pub async fn translate_fields(
        &self,
        records: &[serde_json::Value],
        fields: &[&str],
        source: Language,
    ) -> Vec<serde_json::Value> {
        self.field_translator()
            .translate_fields(records, fields, source, self.preference.current())
            .await
    }

    /// Typed variant of [`Self::translate_fields`].
    pub async fn translate_records<T>(&self, records: &[T], fields: &[&str], source: Language) -> Vec<T>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.field_translator()
            .translate_records(records, fields, source, self.preference.current())
            .await
    }
}
