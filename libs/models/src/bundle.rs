//! FHIR Bundle model
//!
//! Minimal Bundle container. Entries keep their resources as raw JSON so that
//! each one can be ingested (and rejected) on its own terms.

use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Bundle resource
///
/// A container for a collection of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Indicates the purpose of this bundle (collection, batch, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,

    /// Entry in the bundle - will have a resource or information
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// Entry in a Bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// URI for resource (absolute URL server address or URI for UUID/OID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl Bundle {
    /// Parse a Bundle from a JSON value, rejecting other resource types
    pub fn from_value(value: Value) -> Result<Self> {
        let bundle: Bundle = serde_json::from_value(value)?;
        if bundle.resource_type != "Bundle" {
            return Err(Error::InvalidResource(format!(
                "expected resourceType 'Bundle', got '{}'",
                bundle.resource_type
            )));
        }
        Ok(bundle)
    }

    /// Resources of all entries, skipping entries without a resource
    pub fn resources(&self) -> impl Iterator<Item = &Value> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }
}
