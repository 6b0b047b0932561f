//! Mapping table data models
//!
//! This crate provides strongly-typed Rust structures for the raw documents
//! consumed by the harmonization engine.
//!
//! # Module Organization
//!
//! - `concept_map`: the ConceptMap resource (groups, elements, targets, unmapped policy)
//! - `bundle`: a minimal Bundle container used for batch ingestion
//!
//! Models are deliberately permissive: they accept anything that is
//! structurally well-formed JSON of the right shape and leave semantic checks
//! (resource kind, required identifiers, policy modes) to the ingesting store.
//!
//! # Example
//!
//! ```rust
//! use harmonize_models::ConceptMap;
//! use serde_json::json;
//!
//! let cm = ConceptMap::from_value(json!({
//!     "resourceType": "ConceptMap",
//!     "id": "foo",
//!     "version": "bar",
//!     "group": [{
//!         "target": "xyz",
//!         "element": [{ "code": "abc", "target": [{ "code": "def" }] }]
//!     }]
//! }))
//! .unwrap();
//!
//! assert_eq!(cm.id.as_deref(), Some("foo"));
//! assert_eq!(cm.group.len(), 1);
//! ```

pub mod bundle;
pub mod concept_map;
pub mod error;

// Re-export commonly used types
pub use bundle::*;
pub use concept_map::*;
pub use error::{Error, Result};
