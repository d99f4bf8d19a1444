//! Purpose: Summarize decoded envelopes and registries as JSON for CLI output.
//! Exports: `envelope_summary_json`, `registry_tags_json`.
//! Role: Keep stdout shapes consistent across commands.
//! Invariants: Stable key names for v0 summaries; payload fields are never echoed.
//! Invariants: `previous_attributes` keys are emitted in sorted order.

use event_envelope::api::{Envelope, PreviousAttributes, TypeRegistry};
use serde_json::{Map, Value, json};

pub(crate) fn envelope_summary_json(envelope: &Envelope) -> Value {
    let mut map = Map::new();
    match envelope.object() {
        Some(object) => {
            map.insert("type".to_string(), json!(object.object_type()));
            map.insert("typed".to_string(), json!(!object.is_raw()));
            map.insert("id".to_string(), json!(object.id()));
        }
        None => {
            map.insert("type".to_string(), Value::Null);
            map.insert("typed".to_string(), json!(false));
            map.insert("id".to_string(), Value::Null);
        }
    }
    map.insert(
        "previous_attributes".to_string(),
        previous_attributes_json(envelope.previous_attributes()),
    );
    Value::Object(map)
}

fn previous_attributes_json(previous: &PreviousAttributes) -> Value {
    match previous {
        PreviousAttributes::Absent => json!("absent"),
        PreviousAttributes::Null => Value::Null,
        PreviousAttributes::Changed(map) => json!(map.keys().collect::<Vec<_>>()),
    }
}

pub(crate) fn registry_tags_json(registry: &TypeRegistry) -> Value {
    let tags = registry
        .tags()
        .into_iter()
        .map(|tag| {
            let type_name = registry
                .lookup(tag)
                .map(|descriptor| descriptor.type_name())
                .unwrap_or_default();
            json!({"tag": tag, "type": type_name})
        })
        .collect::<Vec<_>>();
    json!({"types": tags})
}

#[cfg(test)]
mod tests {
    use super::{envelope_summary_json, registry_tags_json};
    use event_envelope::api::{TypeRegistry, decode_envelope};
    use serde_json::json;

    #[test]
    fn summary_for_typed_payload_with_diff() {
        let envelope = decode_envelope(&json!({
            "object": {"object": "charge", "id": "ch_1", "amount": 100},
            "previous_attributes": {"status": "pending", "amount": 50},
        }))
        .expect("decode");
        assert_eq!(
            envelope_summary_json(&envelope),
            json!({
                "type": "charge",
                "typed": true,
                "id": "ch_1",
                "previous_attributes": ["amount", "status"],
            })
        );
    }

    #[test]
    fn summary_for_raw_payload_without_diff() {
        let envelope = decode_envelope(&json!({
            "object": {"object": "unknown_future_type", "foo": "bar"},
        }))
        .expect("decode");
        let summary = envelope_summary_json(&envelope);
        assert_eq!(summary["type"], "unknown_future_type");
        assert_eq!(summary["typed"], false);
        assert!(summary["id"].is_null());
        assert_eq!(summary["previous_attributes"], "absent");
    }

    #[test]
    fn tags_listing_matches_registry() {
        let registry = TypeRegistry::standard();
        let value = registry_tags_json(&registry);
        let types = value["types"].as_array().expect("types");
        assert_eq!(types.len(), registry.len());
        assert!(types.contains(&json!({"tag": "charge", "type": "Charge"})));
    }
}
