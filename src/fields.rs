//! Translation of named string fields across lists of records.
//!
//! Used for API payloads such as category or vendor lists, where many records
//! share values ("Plumbing" on every plumber). Distinct values are collected
//! across all records and requested through the shared batcher, so cache hits
//! are served locally and misses join the same batches as displayed text.

use crate::batcher::TranslationBatcher;
use crate::gateway::dedupe_preserving_order;
use crate::i18n::{needs_translation, Language};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ObjectFieldTranslator {
    batcher: TranslationBatcher,
}

impl ObjectFieldTranslator {
    pub fn new(batcher: TranslationBatcher) -> Self {
        Self { batcher }
    }

    /// Replace each named string field of every object record with its
    /// translation.
    ///
    /// Record order, other fields and non-string values are preserved.
    /// Values whose translation failed are left as they were. Values already
    /// queued or in flight for other callers are awaited, not re-sent.
    pub async fn translate_fields(
        &self,
        records: &[Value],
        fields: &[&str],
        source: Language,
        target: Language,
    ) -> Vec<Value> {
        if source == target || records.is_empty() || fields.is_empty() {
            return records.to_vec();
        }

        let values: Vec<&str> = records
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|record| fields.iter().filter_map(move |field| record.get(*field)))
            .filter_map(Value::as_str)
            .filter(|value| needs_translation(value, source))
            .collect();
        let (unique, _) = dedupe_preserving_order(&values);

        debug!(
            "Translating fields {:?} of {} records: {} distinct values",
            fields,
            records.len(),
            unique.len()
        );

        let results = self.batcher.request_many(&unique, source, target).await;
        let translated: HashMap<String, String> = unique
            .into_iter()
            .zip(results)
            .filter(|(value, result)| value != result)
            .collect();

        records
            .iter()
            .map(|record| replace_fields(record, fields, &translated))
            .collect()
    }

    /// Typed variant of [`Self::translate_fields`].
    ///
    /// Records that cannot round-trip through JSON are returned unchanged.
    pub async fn translate_records<T>(
        &self,
        records: &[T],
        fields: &[&str],
        source: Language,
        target: Language,
    ) -> Vec<T>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let values = match records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(values) => values,
            Err(e) => {
                warn!("Could not encode records for translation, keeping originals: {}", e);
                return records.to_vec();
            }
        };

        let translated = self.translate_fields(&values, fields, source, target).await;

        match translated
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
        {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not decode translated records, keeping originals: {}", e);
                records.to_vec()
            }
        }
    }
}

fn replace_fields(record: &Value, fields: &[&str], translated: &HashMap<String, String>) -> Value {
    let mut record = record.clone();
    if let Some(object) = record.as_object_mut() {
        for field in fields {
            if let Some(Value::String(value)) = object.get_mut(*field) {
                if let Some(result) = translated.get(value.as_str()) {
                    *value = result.clone();
                }
            }
        }
    }
    record
}
