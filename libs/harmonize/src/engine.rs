//! Code matching and fallback resolution
//!
//! Pure functions over an immutable [`MappingDocument`]. Group order, element
//! order and target order of the document are preserved in every result.
//!
//! Resolution runs in two phases:
//! 1. every candidate group (source system equal to the query, or empty) is
//!    searched for elements whose source code equals the query; all their
//!    targets are emitted;
//! 2. only if phase 1 produced nothing, each candidate group contributes one
//!    record from its unmapped policy.

use crate::document::{Group, HarmonizedCode, MappingDocument, UnmappedPolicy};

/// Translate `source_code` from `source_system` using `doc`.
///
/// Never fails: an unmapped code yields fallback records, and a document with
/// no candidate groups yields an empty result.
pub fn harmonize(
    doc: &MappingDocument,
    source_code: &str,
    source_system: &str,
) -> Vec<HarmonizedCode> {
    let candidates: Vec<&Group> = candidate_groups(doc, source_system).collect();

    let mut matched = Vec::new();
    for group in &candidates {
        for element in group.elements.iter().filter(|e| e.source_code == source_code) {
            matched.extend(element.targets.iter().map(|target| HarmonizedCode {
                code: target.code.clone(),
                system: group.target_system.clone(),
                display: target.display.clone(),
                version: doc.version.clone(),
            }));
        }
    }

    if !matched.is_empty() {
        return matched;
    }

    if !candidates.is_empty() {
        tracing::debug!(
            document = %doc.id,
            code = %source_code,
            system = %source_system,
            groups = candidates.len(),
            "No mapping found, applying unmapped policies"
        );
    }

    candidates
        .iter()
        .map(|group| resolve_unmapped(group, source_code, &doc.id, &doc.version))
        .collect()
}

/// Like [`harmonize`], restricted to codes in `target_system`.
///
/// An empty `target_system` disables filtering. When nothing survives the
/// filter a single unharmonized record is returned, even if per-group
/// fallbacks were produced for other systems.
pub fn harmonize_with_target(
    doc: &MappingDocument,
    source_code: &str,
    source_system: &str,
    target_system: &str,
) -> Vec<HarmonizedCode> {
    filter_by_target(
        doc,
        harmonize(doc, source_code, source_system),
        source_code,
        target_system,
    )
}

/// Apply the target-system constraint to an already computed result.
pub fn filter_by_target(
    doc: &MappingDocument,
    raw: Vec<HarmonizedCode>,
    source_code: &str,
    target_system: &str,
) -> Vec<HarmonizedCode> {
    if target_system.is_empty() {
        return raw;
    }

    let filtered: Vec<HarmonizedCode> = raw
        .into_iter()
        .filter(|code| code.system == target_system)
        .collect();

    if !filtered.is_empty() {
        return filtered;
    }

    tracing::debug!(
        document = %doc.id,
        code = %source_code,
        target = %target_system,
        "Target system not satisfiable, returning unharmonized code"
    );
    vec![HarmonizedCode::unharmonized(source_code, &doc.id, &doc.version)]
}

fn candidate_groups<'a>(
    doc: &'a MappingDocument,
    source_system: &'a str,
) -> impl Iterator<Item = &'a Group> + 'a {
    doc.groups
        .iter()
        .filter(move |g| g.source_system.is_empty() || g.source_system == source_system)
}

fn resolve_unmapped(
    group: &Group,
    source_code: &str,
    doc_id: &str,
    doc_version: &str,
) -> HarmonizedCode {
    match &group.unmapped {
        UnmappedPolicy::Absent => HarmonizedCode::unharmonized(source_code, doc_id, doc_version),
        UnmappedPolicy::Provided => HarmonizedCode {
            code: source_code.to_string(),
            system: group.target_system.clone(),
            display: source_code.to_string(),
            version: doc_version.to_string(),
        },
        UnmappedPolicy::Fixed { code, display } => HarmonizedCode {
            code: code.clone(),
            system: group.target_system.clone(),
            display: display.clone(),
            version: doc_version.to_string(),
        },
    }
}
