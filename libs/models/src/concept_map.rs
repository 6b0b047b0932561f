//! FHIR ConceptMap model
//!
//! Version-agnostic model for ConceptMaps (R3/R4 `group` layout)

use super::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Resource type discriminator carried by every ConceptMap
pub const CONCEPT_MAP_RESOURCE_TYPE: &str = "ConceptMap";

/// FHIR ConceptMap resource
///
/// A statement of relationships from one set of concepts to one or more other concepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMap {
    /// Resource type - "ConceptMap" for well-formed maps, empty when absent
    #[serde(default)]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Business version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Publication status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Same source and target systems
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<ConceptMapGroup>,

    /// Additional content
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Mappings sharing one source and target system
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMapGroup {
    /// Source system where concepts to be mapped are defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Specific version of the source system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,

    /// Target system that the concepts are to be mapped to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Specific version of the target system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,

    /// Mappings for a concept from the source set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element: Vec<ConceptMapElement>,

    /// What to do when there is no mapping for the source concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmapped: Option<ConceptMapUnmapped>,
}

/// Mappings for one source code
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConceptMapElement {
    /// Identifies element being mapped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Display for the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Concept in target system for element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<ConceptMapTarget>,
}

/// One target concept for a source code
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConceptMapTarget {
    /// Code that identifies the target element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Display for the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// relatedto | equivalent | equal | wider | subsumes | narrower | ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalence: Option<String>,

    /// Description of status/issues in mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// What to do when there is no mapping for the source concept
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConceptMapUnmapped {
    /// provided | fixed | other-map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Fixed code when mode = fixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Display for the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Canonical URL of another ConceptMap when mode = other-map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ConceptMap {
    /// Create a new ConceptMap with the given id and no groups
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            resource_type: CONCEPT_MAP_RESOURCE_TYPE.to_string(),
            id: Some(id.into()),
            url: None,
            version: None,
            name: None,
            status: None,
            group: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    /// Parse a ConceptMap from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a ConceptMap from an already-decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Whether the resource declares itself as a ConceptMap
    pub fn is_concept_map(&self) -> bool {
        self.resource_type == CONCEPT_MAP_RESOURCE_TYPE
    }
}
