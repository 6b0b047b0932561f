//! Harmonizer facade
//!
//! Composes the [`MappingStore`], the match engine and (optionally) an
//! [`ExpiringCache`] of raw harmonization results.

use crate::cache::ExpiringCache;
use crate::config::{CacheSettings, HarmonizerConfig};
use crate::document::{CodeLookupKey, HarmonizedCode, MappingDocument};
use crate::engine;
use crate::store::MappingStore;
use crate::{Error, Result};
use harmonize_models::ConceptMap;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Weak};

/// Translates codes between coding systems.
///
/// `document_id` names the mapping table to use.
pub trait CodeHarmonizer: Send + Sync {
    fn harmonize(
        &self,
        source_code: &str,
        source_system: &str,
        document_id: &str,
    ) -> Result<Vec<HarmonizedCode>>;

    /// An empty `target_system` behaves like [`CodeHarmonizer::harmonize`].
    fn harmonize_with_target(
        &self,
        source_code: &str,
        source_system: &str,
        target_system: &str,
        document_id: &str,
    ) -> Result<Vec<HarmonizedCode>>;
}

/// Memoized result, tied to the document instance that produced it
#[derive(Debug, Clone)]
struct CachedCodes {
    document: Weak<MappingDocument>,
    codes: Vec<HarmonizedCode>,
}

impl CachedCodes {
    fn produced_by(&self, doc: &Arc<MappingDocument>) -> bool {
        std::ptr::eq(self.document.as_ptr(), Arc::as_ptr(doc))
    }
}

/// In-process harmonizer backed by ingested ConceptMaps
#[derive(Debug, Default)]
pub struct Harmonizer {
    store: MappingStore,
    cache: Option<ExpiringCache<CodeLookupKey, CachedCodes>>,
}

impl Harmonizer {
    /// Harmonizer without result caching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Harmonizer memoizing results. Must be called inside a Tokio runtime.
    pub fn with_cache(settings: &CacheSettings) -> Result<Self> {
        let cache = ExpiringCache::new(settings.ttl(), settings.cleanup_interval())?;
        Ok(Self {
            store: MappingStore::new(),
            cache: Some(cache),
        })
    }

    pub fn from_config(config: &HarmonizerConfig) -> Result<Self> {
        if config.cache.enabled {
            Self::with_cache(&config.cache)
        } else {
            Ok(Self::new())
        }
    }

    pub fn add(&self, concept_map: ConceptMap) -> Result<()> {
        let doc = self.store.add(concept_map)?;
        self.invalidate(&doc.id);
        Ok(())
    }

    pub fn add_json(&self, json: &str) -> Result<()> {
        let doc = self.store.add_json(json)?;
        self.invalidate(&doc.id);
        Ok(())
    }

    pub fn add_value(&self, value: &JsonValue) -> Result<()> {
        let doc = self.store.add_value(value)?;
        self.invalidate(&doc.id);
        Ok(())
    }

    pub fn add_bundle(&self, value: &JsonValue) -> Result<()> {
        for doc in self.store.add_bundle(value)? {
            self.invalidate(&doc.id);
        }
        Ok(())
    }

    /// Drop a document and any results cached for it.
    pub fn remove(&self, document_id: &str) -> bool {
        let removed = self.store.remove(document_id);
        if removed {
            self.invalidate(document_id);
        }
        removed
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Resident cache entries; zero when caching is disabled.
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, ExpiringCache::len)
    }

    fn document(&self, document_id: &str) -> Result<Arc<MappingDocument>> {
        self.store
            .get(document_id)
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))
    }

    fn raw(
        &self,
        doc: &Arc<MappingDocument>,
        source_code: &str,
        source_system: &str,
    ) -> Vec<HarmonizedCode> {
        let Some(cache) = &self.cache else {
            return engine::harmonize(doc, source_code, source_system);
        };

        let key = CodeLookupKey::new(source_code, source_system).with_name(doc.id.as_str());
        // An entry written by a lookup that raced a re-ingest may belong to a
        // replaced document; only trust entries produced by `doc` itself.
        if let Some(hit) = cache.get(&key) {
            if hit.produced_by(doc) {
                tracing::trace!(
                    document = %doc.id,
                    code = %source_code,
                    "Harmonization cache hit"
                );
                return hit.codes;
            }
        }

        let codes = engine::harmonize(doc, source_code, source_system);
        let current = self
            .store
            .get(&doc.id)
            .is_some_and(|stored| Arc::ptr_eq(&stored, doc));
        if current {
            cache.put(
                key,
                CachedCodes {
                    document: Arc::downgrade(doc),
                    codes: codes.clone(),
                },
            );
        }
        codes
    }

    fn invalidate(&self, document_id: &str) {
        if let Some(cache) = &self.cache {
            let removed = cache.invalidate_where(|key| key.name.as_deref() == Some(document_id));
            if removed > 0 {
                tracing::debug!(document = %document_id, removed, "Invalidated cached results");
            }
        }
    }
}

impl CodeHarmonizer for Harmonizer {
    fn harmonize(
        &self,
        source_code: &str,
        source_system: &str,
        document_id: &str,
    ) -> Result<Vec<HarmonizedCode>> {
        let doc = self.document(document_id)?;
        Ok(self.raw(&doc, source_code, source_system))
    }

    fn harmonize_with_target(
        &self,
        source_code: &str,
        source_system: &str,
        target_system: &str,
        document_id: &str,
    ) -> Result<Vec<HarmonizedCode>> {
        let doc = self.document(document_id)?;
        let raw = self.raw(&doc, source_code, source_system);
        Ok(engine::filter_by_target(&doc, raw, source_code, target_system))
    }
}
