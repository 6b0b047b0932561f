//! Code harmonization engine
//!
//! Translates a code from a source coding system into codes of target systems
//! using ConceptMap mapping tables:
//! - Ingestion validates raw ConceptMaps once, into immutable documents
//! - Matching walks groups in order, with wildcard source systems
//! - Per-group unmapped policies (`provided`, `fixed`, or the default
//!   `<id>-unharmonized` bucket) guarantee every code produces output
//! - An optional expiring cache memoizes results with background eviction
//!
//! # Example
//!
//! ```rust
//! use harmonize::{CodeHarmonizer, Harmonizer};
//! use serde_json::json;
//!
//! let harmonizer = Harmonizer::new();
//! harmonizer
//!     .add_value(&json!({
//!         "resourceType": "ConceptMap",
//!         "id": "foo",
//!         "version": "bar",
//!         "group": [{
//!             "target": "xyz",
//!             "element": [{ "code": "abc", "target": [{ "code": "def" }] }]
//!         }]
//!     }))
//!     .unwrap();
//!
//! let codes = harmonizer.harmonize("abc", "anything", "foo").unwrap();
//! assert_eq!(codes[0].code, "def");
//! assert_eq!(codes[0].system, "xyz");
//!
//! let codes = harmonizer.harmonize("zzz", "anything", "foo").unwrap();
//! assert_eq!(codes[0].system, "foo-unharmonized");
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod harmonizer;
pub mod logging;
pub mod store;

pub use cache::ExpiringCache;
pub use config::{CacheSettings, HarmonizerConfig, LoggingConfig};
pub use document::{
    CodeLookupKey, Element, Group, HarmonizedCode, MappingDocument, Target, UnmappedPolicy,
};
pub use error::{Error, Result};
pub use harmonizer::{CodeHarmonizer, Harmonizer};
pub use store::MappingStore;
