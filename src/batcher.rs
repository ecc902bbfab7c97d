//! Pending-batch registry that coalesces concurrent cache misses.
//!
//! Misses for the same (source, target) pair are collected into one open
//! batch, which is flushed through the gateway when its collection window
//! elapses or it reaches the gateway's batch size. A key that is already
//! queued or in flight is never queued again: later callers wait on the
//! same result.

use crate::cache::{TranslationCache, TranslationKey};
use crate::gateway::TranslationGateway;
use crate::i18n::{Language, TranslationMetrics};
use futures::future::join_all;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::debug;

type LanguagePair = (Language, Language);

#[derive(Debug)]
struct OpenBatch {
    id: u64,
    texts: Vec<String>,
}

#[derive(Debug, Default)]
struct Registry {
    /// Batches still collecting, at most one per language pair
    open: HashMap<LanguagePair, OpenBatch>,
    /// Callers waiting on each queued or in-flight key
    waiters: HashMap<TranslationKey, Vec<oneshot::Sender<String>>>,
    next_batch_id: u64,
}

#[derive(Debug)]
struct Inner {
    gateway: TranslationGateway,
    cache: TranslationCache,
    window: Duration,
    registry: Mutex<Registry>,
}

/// Shared handle to the batch registry. Clones share the same registry.
#[derive(Debug, Clone)]
pub struct TranslationBatcher {
    inner: Arc<Inner>,
}

impl TranslationBatcher {
    pub fn new(gateway: TranslationGateway, cache: TranslationCache, window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                cache,
                window,
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.inner.cache
    }

    pub fn gateway(&self) -> &TranslationGateway {
        &self.inner.gateway
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        self.inner.gateway.metrics()
    }

    /// Number of keys queued or in flight.
    pub fn pending(&self) -> usize {
        self.registry().waiters.len()
    }

    /// Resolve one translation.
    ///
    /// Serves the cache when possible, otherwise joins (or opens) the batch
    /// for the language pair. Never fails: a failed call resolves to `text`.
    pub async fn request(&self, text: impl Into<String>, source: Language, target: Language) -> String {
        let text = text.into();
        if source == target || text.is_empty() {
            return text;
        }

        let key = TranslationKey::new(text, source, target);
        if let Some(hit) = self.inner.cache.get(&key) {
            self.metrics().record_cache_hit();
            return hit;
        }

        let receiver = self.enqueue(&key);
        // A dropped sender means the flush never completed; show the source.
        receiver.await.unwrap_or(key.text)
    }

    /// Resolve several translations, all joining the same batch.
    pub async fn request_many<S: AsRef<str>>(
        &self,
        texts: &[S],
        source: Language,
        target: Language,
    ) -> Vec<String> {
        join_all(
            texts
                .iter()
                .map(|text| self.request(text.as_ref(), source, target)),
        )
        .await
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, key: &TranslationKey) -> oneshot::Receiver<String> {
        let (sender, receiver) = oneshot::channel();
        let pair = (key.source, key.target);
        let max_items = self.inner.gateway.max_batch_items();

        let mut guard = self.registry();
        let registry = &mut *guard;

        // A flush may have completed between the caller's lookup and this lock.
        if let Some(hit) = self.inner.cache.get(key) {
            self.metrics().record_cache_hit();
            let _ = sender.send(hit);
            return receiver;
        }

        if let Some(waiters) = registry.waiters.get_mut(key) {
            self.metrics().record_coalesced();
            waiters.push(sender);
            return receiver;
        }

        self.metrics().record_cache_miss();
        registry.waiters.insert(key.clone(), vec![sender]);

        let mut opened = None;
        let batch = match registry.open.entry(pair) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let id = registry.next_batch_id;
                registry.next_batch_id += 1;
                opened = Some(id);
                entry.insert(OpenBatch {
                    id,
                    texts: Vec::new(),
                })
            }
        };
        batch.texts.push(key.text.clone());
        let full = batch.texts.len() >= max_items;

        let flush_now = if full { registry.open.remove(&pair) } else { None };
        drop(guard);

        if let Some(batch) = flush_now {
            debug!(
                "Batch {} for {} -> {} is full ({} texts), flushing",
                batch.id,
                pair.0,
                pair.1,
                batch.texts.len()
            );
            let this = self.clone();
            tokio::spawn(async move { this.flush(pair, batch.texts).await });
        } else if let Some(id) = opened {
            let this = self.clone();
            tokio::spawn(async move {
                sleep(this.inner.window).await;
                this.flush_if_open(pair, id).await;
            });
        }

        receiver
    }

    /// Flush the open batch for `pair` if it is still batch `id`.
    async fn flush_if_open(&self, pair: LanguagePair, id: u64) {
        let batch = {
            let mut registry = self.registry();
            match registry.open.get(&pair) {
                Some(batch) if batch.id == id => registry.open.remove(&pair),
                _ => None,
            }
        };

        if let Some(batch) = batch {
            debug!(
                "Batch {} for {} -> {} window elapsed ({} texts), flushing",
                batch.id,
                pair.0,
                pair.1,
                batch.texts.len()
            );
            self.flush(pair, batch.texts).await;
        }
    }

    async fn flush(&self, (source, target): LanguagePair, texts: Vec<String>) {
        let outcomes = self
            .inner
            .gateway
            .translate_unique(&texts, source, target)
            .await;

        let mut resolved = Vec::with_capacity(texts.len());
        for (text, outcome) in texts.into_iter().zip(outcomes) {
            let key = TranslationKey::new(text, source, target);
            let value = match outcome {
                Some(translated) => {
                    self.inner.cache.put(key.clone(), translated.clone());
                    translated
                }
                None => key.text.clone(),
            };
            resolved.push((key, value));
        }

        // Cache is populated before waiters are released, so a request that
        // misses the waiter map afterwards finds the cache entry instead.
        let mut registry = self.registry();
        for (key, value) in resolved {
            if let Some(waiters) = registry.waiters.remove(&key) {
                for waiter in waiters {
                    // Receiver gone means the caller was cancelled.
                    let _ = waiter.send(value.clone());
                }
            }
        }
    }
}
