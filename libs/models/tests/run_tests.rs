use harmonize_models::{Bundle, ConceptMap};

const R3_CONCEPT_MAP: &str = r#"{
    "resourceType": "ConceptMap",
    "id": "map-id",
    "version": "bar",
    "status": "active",
    "group": [
        {
            "source": "foo",
            "target": "xyz",
            "element": [
                {
                    "code": "abc",
                    "target": [
                        { "code": "def", "display": "DEF", "equivalence": "EQUIVALENT" }
                    ]
                }
            ],
            "unmapped": {
                "mode": "fixed",
                "code": "unknown",
                "display": "Unknown Code"
            }
        }
    ]
}"#;

#[test]
fn parse_r3_concept_map() {
    let cm = ConceptMap::from_json_str(R3_CONCEPT_MAP).expect("concept map should parse");

    assert_eq!(cm.resource_type, "ConceptMap");
    assert_eq!(cm.id.as_deref(), Some("map-id"));
    assert_eq!(cm.version.as_deref(), Some("bar"));
    assert_eq!(cm.group.len(), 1);

    let group = &cm.group[0];
    assert_eq!(group.source.as_deref(), Some("foo"));
    assert_eq!(group.target.as_deref(), Some("xyz"));

    let element = &group.element[0];
    assert_eq!(element.code.as_deref(), Some("abc"));
    assert_eq!(element.target[0].display.as_deref(), Some("DEF"));
    assert_eq!(element.target[0].equivalence.as_deref(), Some("EQUIVALENT"));

    let unmapped = group.unmapped.as_ref().expect("unmapped should be present");
    assert_eq!(unmapped.mode.as_deref(), Some("fixed"));
    assert_eq!(unmapped.code.as_deref(), Some("unknown"));
}

#[test]
fn serialize_omits_empty_fields() {
    let cm = ConceptMap::new("foo");
    let value = serde_json::to_value(&cm).unwrap();

    assert_eq!(
        value,
        serde_json::json!({ "resourceType": "ConceptMap", "id": "foo" })
    );
}

#[test]
fn parse_bundle_of_concept_maps() {
    let bundle = Bundle::from_value(serde_json::json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [{ "resource": serde_json::from_str::<serde_json::Value>(R3_CONCEPT_MAP).unwrap() }]
    }))
    .unwrap();

    let maps: Vec<ConceptMap> = bundle
        .resources()
        .map(|r| ConceptMap::from_value(r.clone()).unwrap())
        .collect();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id.as_deref(), Some("map-id"));
}
