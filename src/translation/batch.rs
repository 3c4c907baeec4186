/*!
 * Batch translation processing.
 *
 * Items are translated one after another, in input order, each going through
 * the same cache-aside path as a single request. The first failing item
 * aborts the batch and its index is reported; nothing is returned for the
 * items that already succeeded, although their cache writes are kept.
 */

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::core::TranslationService;
use crate::errors::TranslationError;

/// One text to translate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationItem {
    pub fn new(
        source_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

/// A translated item, echoing the request as given
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedItem {
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub translated_text: String,
}

/// Batch translator running items through a shared service
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService) -> Self {
        Self { service }
    }

    /// Translate every item in order, failing the whole batch on the first error
    pub async fn translate_batch(
        &self,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslatedItem>, TranslationError> {
        let start_time = Instant::now();
        let mut results = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let translated = self
                .service
                .translate(&item.source_text, &item.source_lang, &item.target_lang)
                .await
                .map_err(|e| {
                    error!("Batch item {} of {} failed: {}", index + 1, items.len(), e);
                    TranslationError::BatchItem {
                        index,
                        source: Box::new(e),
                    }
                })?;

            results.push(TranslatedItem {
                source_text: item.source_text.clone(),
                source_lang: item.source_lang.clone(),
                target_lang: item.target_lang.clone(),
                translated_text: translated,
            });
        }

        debug!(
            "Translated batch of {} items in {:?}",
            results.len(),
            start_time.elapsed()
        );
        Ok(results)
    }
}
