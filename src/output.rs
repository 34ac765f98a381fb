//! JSON rendering of records for the command line.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use record_core::{PayloadValue, Record};
use serde_json::{json, Map, Value};

/// Render a record as one JSON object.
///
/// Raw payloads become `{"raw": "<base64>"}`, structured payloads become
/// plain JSON objects and missing payloads become `null`.
pub fn record_to_json(record: &Record) -> serde_json::Result<Value> {
    let attributes: Map<String, Value> = record
        .metadata
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let before = record.payload.before.as_ref().map(payload_to_json).transpose()?;
    let after = record.payload.after.as_ref().map(payload_to_json).transpose()?;

    Ok(json!({
        "position": record.position.as_str(),
        "operation": record.operation.as_str(),
        "metadata": {
            "created_at": record.metadata.created_at.to_rfc3339(),
            "collection": record.metadata.collection,
            "attributes": attributes,
        },
        "key": record.key,
        "payload": {
            "before": before,
            "after": after,
        },
    }))
}

fn payload_to_json(payload: &PayloadValue) -> serde_json::Result<Value> {
    match payload {
        PayloadValue::Raw(bytes) => Ok(json!({ "raw": STANDARD.encode(bytes) })),
        PayloadValue::Structured(data) => serde_json::to_value(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use record_core::{FieldValue, Metadata, Operation, Payload, Position, StructuredData};

    fn record(operation: Operation, payload: Payload) -> Record {
        Record {
            position: Position::from_counter(7),
            operation,
            metadata: Metadata::now().with_collection("users"),
            key: "quasi".to_string(),
            payload,
        }
    }

    #[test]
    fn test_raw_payload_is_base64() {
        let rec = record(
            Operation::Create,
            Payload {
                before: None,
                after: Some(PayloadValue::Raw(Bytes::from_static(b"hello"))),
            },
        );
        let value = record_to_json(&rec).unwrap();

        assert_eq!(value["position"], "7");
        assert_eq!(value["operation"], "create");
        assert_eq!(value["key"], "quasi");
        assert_eq!(value["metadata"]["collection"], "users");
        assert_eq!(value["payload"]["after"]["raw"], "aGVsbG8=");
        assert!(value["payload"]["before"].is_null());
    }

    #[test]
    fn test_structured_payload_is_object() {
        let mut data = StructuredData::new();
        data.insert("id".to_string(), FieldValue::Int(3));
        data.insert("name".to_string(), FieldValue::String("ada".to_string()));
        let mut rec = record(
            Operation::Delete,
            Payload {
                before: Some(PayloadValue::Structured(data)),
                after: None,
            },
        );
        rec.metadata.set_attribute("schema.subject", "users.v1");

        let value = record_to_json(&rec).unwrap();
        assert_eq!(value["payload"]["before"]["id"], 3);
        assert_eq!(value["payload"]["before"]["name"], "ada");
        assert!(value["payload"]["after"].is_null());
        assert_eq!(value["metadata"]["attributes"]["schema.subject"], "users.v1");
    }

    #[test]
    fn test_structured_values_keep_their_kind() {
        let mut data = StructuredData::new();
        data.insert("ttl".to_string(), FieldValue::Duration(std::time::Duration::from_secs(2)));
        data.insert("admin".to_string(), FieldValue::Bool(true));
        let rec = record(
            Operation::Update,
            Payload {
                before: Some(PayloadValue::Structured(data.clone())),
                after: Some(PayloadValue::Structured(data)),
            },
        );

        let value = record_to_json(&rec).unwrap();
        for side in ["before", "after"] {
            assert_eq!(value["payload"][side]["ttl"], 2_000_000_000u64);
            assert_eq!(value["payload"][side]["admin"], true);
        }
    }
}
