#![allow(dead_code)]

use harmonize::{HarmonizedCode, Harmonizer};
use serde_json::{json, Value};

/// Builds a harmonizer with every given ConceptMap ingested
pub fn harmonizer_with(maps: &[Value]) -> anyhow::Result<Harmonizer> {
    let harmonizer = Harmonizer::new();
    for map in maps {
        harmonizer.add_value(map)?;
    }
    Ok(harmonizer)
}

pub fn code(code: &str, system: &str, display: &str, version: &str) -> HarmonizedCode {
    HarmonizedCode {
        code: code.to_string(),
        system: system.to_string(),
        display: display.to_string(),
        version: version.to_string(),
    }
}

/// Builder for ConceptMap resources
pub struct ConceptMapBuilder {
    id: String,
    version: String,
    groups: Vec<Value>,
}

impl ConceptMapBuilder {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            groups: Vec::new(),
        }
    }

    pub fn group(mut self, group: GroupBuilder) -> Self {
        self.groups.push(group.build());
        self
    }

    pub fn build(self) -> Value {
        json!({
            "resourceType": "ConceptMap",
            "id": self.id,
            "version": self.version,
            "group": self.groups
        })
    }
}

/// Builder for ConceptMap.group entries
pub struct GroupBuilder {
    source: Option<String>,
    target: String,
    elements: Vec<Value>,
    unmapped: Option<Value>,
}

impl GroupBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: target.into(),
            elements: Vec::new(),
            unmapped: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Element mapping `code` to targets given as (code, display) pairs
    pub fn element(mut self, code: &str, targets: &[(&str, Option<&str>)]) -> Self {
        let targets: Vec<Value> = targets
            .iter()
            .map(|(code, display)| {
                let mut target = json!({ "code": code, "equivalence": "EQUIVALENT" });
                if let Some(display) = display {
                    target["display"] = json!(display);
                }
                target
            })
            .collect();
        self.elements.push(json!({ "code": code, "target": targets }));
        self
    }

    pub fn provided(mut self) -> Self {
        self.unmapped = Some(json!({ "mode": "provided" }));
        self
    }

    pub fn fixed(mut self, code: &str, display: &str) -> Self {
        self.unmapped = Some(json!({ "mode": "fixed", "code": code, "display": display }));
        self
    }

    pub fn build(self) -> Value {
        let mut group = json!({ "target": self.target, "element": self.elements });
        if let Some(source) = self.source {
            group["source"] = json!(source);
        }
        if let Some(unmapped) = self.unmapped {
            group["unmapped"] = unmapped;
        }
        group
    }
}
