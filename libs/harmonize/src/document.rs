//! Validated, immutable mapping documents
//!
//! A [`MappingDocument`] is what a raw [`ConceptMap`] becomes once it has
//! passed ingestion. Everything the match engine relies on (non-empty id,
//! at least one group, a target for every element, a closed unmapped policy)
//! is checked here exactly once.

use crate::{Error, Result};
use harmonize_models::{ConceptMap, ConceptMapElement, ConceptMapGroup, ConceptMapUnmapped};
use serde::{Deserialize, Serialize};

/// Suffix appended to a document id to form the system of unharmonized codes
pub const UNHARMONIZED_SUFFIX: &str = "-unharmonized";

/// One ingested mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDocument {
    pub id: String,
    /// Propagated verbatim into every harmonized code
    pub version: String,
    pub groups: Vec<Group>,
}

/// Mappings scoped to one target system and, optionally, one source system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Empty means the group applies to every queried source system
    pub source_system: String,
    pub target_system: String,
    pub elements: Vec<Element>,
    pub unmapped: UnmappedPolicy,
}

/// Target correspondences for one source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub source_code: String,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub code: String,
    pub display: String,
    /// Informational only, never consulted when matching
    pub equivalence: String,
}

/// What a group produces for a code it has no element for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UnmappedPolicy {
    /// Code lands in the `<document id>-unharmonized` system
    #[default]
    Absent,
    /// Source code passes through into the group's target system
    Provided,
    /// A constant code replaces the source code
    Fixed { code: String, display: String },
}

/// One resolved (or fallback) translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HarmonizedCode {
    pub code: String,
    pub system: String,
    pub display: String,
    pub version: String,
}

/// Cache key for memoized lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeLookupKey {
    pub code: String,
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CodeLookupKey {
    pub fn new(code: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            system: system.into(),
            name: None,
        }
    }

    /// Scope the key to a mapping document
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl HarmonizedCode {
    /// Fallback record placing `code` in the document's unharmonized system
    pub fn unharmonized(code: &str, document_id: &str, version: &str) -> Self {
        Self {
            code: code.to_string(),
            system: unharmonized_system(document_id),
            display: String::new(),
            version: version.to_string(),
        }
    }
}

/// System label used for codes a document could not translate
pub fn unharmonized_system(document_id: &str) -> String {
    format!("{}{}", document_id, UNHARMONIZED_SUFFIX)
}

/// Validation happens once, here. Rejected with [`Error::Validation`]:
/// a resource that is not a ConceptMap, a missing or empty id, no groups, a
/// group without a target system, an element with an empty code or no
/// targets, a target without a code, an unmapped mode other than `provided`
/// or `fixed`, and a `fixed` mode lacking code or display. An unmapped block
/// with no (or an empty) mode means no fallback policy.
impl TryFrom<ConceptMap> for MappingDocument {
    type Error = Error;

    fn try_from(cm: ConceptMap) -> Result<Self> {
        if !cm.is_concept_map() {
            let kind = if cm.resource_type.is_empty() {
                "<missing>"
            } else {
                cm.resource_type.as_str()
            };
            return Err(Error::Validation(format!(
                "resource is not a ConceptMap (resourceType {})",
                kind
            )));
        }

        let id = match cm.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(Error::Validation("ConceptMap is missing an id".to_string())),
        };

        if cm.group.is_empty() {
            return Err(Error::Validation(format!(
                "ConceptMap '{}' has no groups",
                id
            )));
        }

        let groups = cm
            .group
            .into_iter()
            .enumerate()
            .map(|(idx, group)| convert_group(&id, idx, group))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            version: cm.version.unwrap_or_default(),
            groups,
        })
    }
}

fn convert_group(doc_id: &str, idx: usize, group: ConceptMapGroup) -> Result<Group> {
    let target_system = match group.target {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(Error::Validation(format!(
                "ConceptMap '{}' group[{}] is missing a target system",
                doc_id, idx
            )))
        }
    };

    let elements = group
        .element
        .into_iter()
        .enumerate()
        .map(|(el_idx, element)| convert_element(doc_id, idx, el_idx, element))
        .collect::<Result<Vec<_>>>()?;

    let unmapped = match group.unmapped {
        Some(unmapped) => convert_unmapped(doc_id, idx, unmapped)?,
        None => UnmappedPolicy::Absent,
    };

    Ok(Group {
        source_system: group.source.unwrap_or_default(),
        target_system,
        elements,
        unmapped,
    })
}

fn convert_element(
    doc_id: &str,
    group_idx: usize,
    el_idx: usize,
    element: ConceptMapElement,
) -> Result<Element> {
    let location = || format!("ConceptMap '{}' group[{}].element[{}]", doc_id, group_idx, el_idx);

    let source_code = match element.code {
        Some(code) if !code.is_empty() => code,
        _ => return Err(Error::Validation(format!("{} is missing a code", location()))),
    };

    if element.target.is_empty() {
        return Err(Error::Validation(format!(
            "{} ('{}') has no targets",
            location(),
            source_code
        )));
    }

    let mut targets = Vec::with_capacity(element.target.len());
    for (t_idx, target) in element.target.into_iter().enumerate() {
        let code = match target.code {
            Some(code) if !code.is_empty() => code,
            _ => {
                return Err(Error::Validation(format!(
                    "{}.target[{}] is missing a code",
                    location(),
                    t_idx
                )))
            }
        };
        targets.push(Target {
            code,
            display: target.display.unwrap_or_default(),
            equivalence: target.equivalence.unwrap_or_default(),
        });
    }

    Ok(Element {
        source_code,
        targets,
    })
}

fn convert_unmapped(
    doc_id: &str,
    group_idx: usize,
    unmapped: ConceptMapUnmapped,
) -> Result<UnmappedPolicy> {
    match unmapped.mode.as_deref() {
        None | Some("") => Ok(UnmappedPolicy::Absent),
        Some("provided") => Ok(UnmappedPolicy::Provided),
        Some("fixed") => match (unmapped.code, unmapped.display) {
            (Some(code), Some(display)) if !code.is_empty() && !display.is_empty() => {
                Ok(UnmappedPolicy::Fixed { code, display })
            }
            _ => Err(Error::Validation(format!(
                "ConceptMap '{}' group[{}]: fixed unmapped mode requires both code and display",
                doc_id, group_idx
            ))),
        },
        Some(other) => Err(Error::Validation(format!(
            "ConceptMap '{}' group[{}]: unsupported unmapped mode '{}'",
            doc_id, group_idx, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<MappingDocument> {
        MappingDocument::try_from(ConceptMap::from_value(value).unwrap())
    }

    fn single_group(unmapped: serde_json::Value) -> serde_json::Value {
        json!({
            "resourceType": "ConceptMap",
            "id": "map-id",
            "version": "bar",
            "group": [{
                "source": "foo",
                "target": "xyz",
                "element": [{
                    "code": "abc",
                    "target": [{ "code": "def", "equivalence": "EQUIVALENT" }]
                }],
                "unmapped": unmapped
            }]
        })
    }

    #[test]
    fn test_converts_valid_document() {
        let doc = parse(single_group(json!({ "mode": "provided" }))).unwrap();

        assert_eq!(doc.id, "map-id");
        assert_eq!(doc.version, "bar");
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].source_system, "foo");
        assert_eq!(doc.groups[0].target_system, "xyz");
        assert_eq!(doc.groups[0].unmapped, UnmappedPolicy::Provided);
        assert_eq!(doc.groups[0].elements[0].targets[0].display, "");
        assert_eq!(doc.groups[0].elements[0].targets[0].equivalence, "EQUIVALENT");
    }

    #[test]
    fn test_missing_source_is_wildcard() {
        let doc = parse(json!({
            "resourceType": "ConceptMap",
            "id": "foo",
            "group": [{ "target": "xyz", "element": [] }]
        }))
        .unwrap();

        assert_eq!(doc.groups[0].source_system, "");
        assert_eq!(doc.version, "");
        assert_eq!(doc.groups[0].unmapped, UnmappedPolicy::Absent);
    }

    #[test]
    fn test_fixed_policy() {
        let doc = parse(single_group(json!({
            "mode": "fixed",
            "code": "unknown",
            "display": "Unknown Code"
        })))
        .unwrap();

        assert_eq!(
            doc.groups[0].unmapped,
            UnmappedPolicy::Fixed {
                code: "unknown".to_string(),
                display: "Unknown Code".to_string()
            }
        );
    }

    #[test]
    fn test_unmapped_without_mode_is_absent() {
        let doc = parse(single_group(json!({}))).unwrap();
        assert_eq!(doc.groups[0].unmapped, UnmappedPolicy::Absent);
    }

    #[test]
    fn test_empty_unmapped_mode_is_absent() {
        let doc = parse(single_group(json!({ "mode": "" }))).unwrap();
        assert_eq!(doc.groups[0].unmapped, UnmappedPolicy::Absent);
    }

    #[test]
    fn test_rejects_incomplete_fixed_policy() {
        let err = parse(single_group(json!({ "mode": "fixed", "code": "unknown" }))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_other_map_mode() {
        let err = parse(single_group(json!({ "mode": "other-map" }))).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("other-map")));
    }

    #[test]
    fn test_rejects_wrong_resource_type() {
        let err = parse(json!({ "resourceType": "Patient", "id": "abc" })).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_missing_resource_type() {
        let err = parse(json!({
            "id": "foo",
            "group": [{ "target": "xyz" }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("<missing>")));
    }

    #[test]
    fn test_rejects_missing_id() {
        let err = parse(json!({
            "resourceType": "ConceptMap",
            "group": [{ "target": "xyz" }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = parse(json!({
            "resourceType": "ConceptMap",
            "id": "",
            "group": [{ "target": "xyz" }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_missing_groups() {
        let err = parse(json!({
            "resourceType": "ConceptMap",
            "id": "foo",
            "version": "bar"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("no groups")));
    }

    #[test]
    fn test_rejects_group_without_target_system() {
        let err = parse(json!({
            "resourceType": "ConceptMap",
            "id": "foo",
            "group": [{ "source": "s1" }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("group[0]")));
    }

    #[test]
    fn test_rejects_element_without_code() {
        let err = parse(json!({
            "resourceType": "ConceptMap",
            "id": "foo",
            "group": [{
                "target": "xyz",
                "element": [{ "code": "", "target": [{ "code": "def" }] }]
            }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("element[0]")));
    }

    #[test]
    fn test_rejects_element_without_targets() {
        let err = parse(json!({
            "resourceType": "ConceptMap",
            "id": "foo",
            "group": [{ "target": "xyz", "element": [{ "code": "abc" }] }]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("no targets")));
    }

    #[test]
    fn test_unharmonized_record() {
        let code = HarmonizedCode::unharmonized("zzz", "foo", "bar");
        assert_eq!(
            code,
            HarmonizedCode {
                code: "zzz".to_string(),
                system: "foo-unharmonized".to_string(),
                display: String::new(),
                version: "bar".to_string(),
            }
        );
    }
}
