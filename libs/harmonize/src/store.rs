//! Ingestion and indexing of mapping documents
//!
//! Raw documents are validated into [`MappingDocument`]s on the way in, so a
//! lookup never has to re-check anything. Ingestion is all-or-nothing: a
//! document (or a whole bundle) is either fully indexed or not stored at all.

use crate::document::MappingDocument;
use crate::{Error, Result};
use harmonize_models::{Bundle, ConceptMap};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Index of validated mapping documents keyed by id
#[derive(Debug, Default)]
pub struct MappingStore {
    documents: RwLock<HashMap<String, Arc<MappingDocument>>>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a ConceptMap, replacing any document with the same id.
    ///
    /// Returns the stored document.
    pub fn add(&self, concept_map: ConceptMap) -> Result<Arc<MappingDocument>> {
        let doc = Arc::new(MappingDocument::try_from(concept_map)?);
        self.insert(Arc::clone(&doc));
        Ok(doc)
    }

    /// Parse, validate and store a ConceptMap given as JSON text.
    pub fn add_json(&self, json: &str) -> Result<Arc<MappingDocument>> {
        self.add(ConceptMap::from_json_str(json)?)
    }

    /// Parse, validate and store a ConceptMap given as a JSON value.
    pub fn add_value(&self, value: &JsonValue) -> Result<Arc<MappingDocument>> {
        self.add(ConceptMap::from_value(value.clone())?)
    }

    /// Ingest every ConceptMap in a Bundle.
    ///
    /// All entries are validated before any is stored; one bad entry leaves
    /// the store untouched.
    pub fn add_bundle(&self, value: &JsonValue) -> Result<Vec<Arc<MappingDocument>>> {
        let bundle = Bundle::from_value(value.clone())?;

        let docs = bundle
            .resources()
            .enumerate()
            .map(|(idx, resource)| {
                ConceptMap::from_value(resource.clone())
                    .map_err(Error::from)
                    .and_then(MappingDocument::try_from)
                    .map(Arc::new)
                    .map_err(|e| prefix_error(e, idx))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut documents = self.documents.write();
        for doc in &docs {
            if documents.insert(doc.id.clone(), Arc::clone(doc)).is_some() {
                tracing::info!(id = %doc.id, version = %doc.version, "Replaced mapping document");
            }
        }
        drop(documents);

        tracing::info!(count = docs.len(), "Ingested mapping bundle");
        Ok(docs)
    }

    /// Exact lookup by document id.
    pub fn get(&self, id: &str) -> Option<Arc<MappingDocument>> {
        self.documents.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.read().contains_key(id)
    }

    /// Remove a document, returning whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.documents.write().remove(id).is_some();
        if removed {
            tracing::info!(id = %id, "Removed mapping document");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Ids of all stored documents, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn insert(&self, doc: Arc<MappingDocument>) {
        let previous = self.documents.write().insert(doc.id.clone(), Arc::clone(&doc));
        match previous {
            Some(prev) => tracing::info!(
                id = %doc.id,
                previous_version = %prev.version,
                version = %doc.version,
                "Replaced mapping document"
            ),
            None => tracing::info!(
                id = %doc.id,
                version = %doc.version,
                groups = doc.groups.len(),
                "Ingested mapping document"
            ),
        }
    }
}

fn prefix_error(err: Error, idx: usize) -> Error {
    match err {
        Error::Parse(msg) => Error::Parse(format!("entry[{}]: {}", idx, msg)),
        Error::Validation(msg) => Error::Validation(format!("entry[{}]: {}", idx, msg)),
        other => other,
    }
}
