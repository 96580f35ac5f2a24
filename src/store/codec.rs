//! Translation between plain serde JSON and Firestore's typed document
//! representation (`{"fields": {"name": {"stringValue": ...}}}`).
//!
//! Entities serialize to ordinary JSON first; this module only reshapes
//! values. Fields named in `timestamp_fields` are written as
//! `timestampValue` so the store indexes them as instants (the class `date`
//! field), and come back as RFC 3339 strings that chrono's serde accepts.

use serde_json::{json, Map, Value};

/// Encode a serialized entity as a Firestore document body.
pub fn to_document(entity: &Value, timestamp_fields: &[&str]) -> Value {
    let mut fields = Map::new();
    if let Value::Object(obj) = entity {
        for (key, value) in obj {
            let encoded = if timestamp_fields.contains(&key.as_str()) {
                json!({ "timestampValue": value })
            } else {
                encode_value(value)
            };
            fields.insert(key.clone(), encoded);
        }
    }
    json!({ "fields": fields })
}

/// Decode a Firestore document into plain JSON, recovering the document id
/// from the trailing segment of the resource name.
pub fn from_document(document: &Value) -> Value {
    let mut out = Map::new();
    if let Some(fields) = document.get("fields").and_then(Value::as_object) {
        for (key, value) in fields {
            out.insert(key.clone(), decode_value(value));
        }
    }
    if let Some(id) = document_id(document) {
        out.insert("id".to_string(), Value::String(id.to_string()));
    }
    Value::Object(out)
}

/// The document key, i.e. the last segment of
/// `projects/<p>/databases/(default)/documents/<collection>/<id>`.
pub fn document_id(document: &Value) -> Option<&str> {
    document.get("name")?.as_str()?.rsplit('/').next()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore carries integers as decimal strings.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(ts) = obj.get("timestampValue") {
        return ts.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        return i
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or(Value::Null);
    }
    if let Some(d) = obj.get("doubleValue") {
        return d.clone();
    }
    if let Some(arr) = obj.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = obj.get("mapValue") {
        let fields = map
            .get("fields")
            .and_then(Value::as_object)
            .map(|fs| {
                fs.iter()
                    .map(|(k, v)| (k.clone(), decode_value(v)))
                    .collect()
            })
            .unwrap_or_default();
        return Value::Object(fields);
    }
    // nullValue, or a value kind we do not store.
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Class;

    #[test]
    fn class_round_trips_with_timestamp_date() {
        let class: Class = serde_json::from_value(json!({
            "id": "1715349600000",
            "title": "Morning Pilates",
            "description": "Mat pilates",
            "instructor": "Kim",
            "date": "2024-05-10T14:00:00Z",
            "duration": 60,
            "maxParticipants": 10,
            "currentParticipants": 5,
            "location": "Studio B"
        }))
        .unwrap();

        let plain = serde_json::to_value(&class).unwrap();
        let doc = to_document(&plain, &["date"]);
        assert_eq!(doc["fields"]["date"]["timestampValue"], "2024-05-10T14:00:00Z");
        assert_eq!(doc["fields"]["duration"]["integerValue"], "60");
        assert_eq!(doc["fields"]["title"]["stringValue"], "Morning Pilates");

        // Simulate what the store hands back.
        let mut stored = doc;
        stored["name"] = json!(
            "projects/demo/databases/(default)/documents/classes/1715349600000"
        );
        let decoded = from_document(&stored);
        let back: Class = serde_json::from_value(decoded).unwrap();
        assert_eq!(back, class);
    }

    #[test]
    fn document_id_is_last_name_segment() {
        let doc = json!({
            "name": "projects/demo/databases/(default)/documents/instructors/1700000000000",
            "fields": {}
        });
        assert_eq!(document_id(&doc), Some("1700000000000"));
    }

    #[test]
    fn nested_maps_and_arrays_survive() {
        let plain = json!({
            "name": "re: Play",
            "contact": { "phone": "02-1234-5678", "email": "e", "address": "a" },
            "tags": ["yoga", "pilates"],
            "active": true
        });
        let decoded = from_document(&to_document(&plain, &[]));
        assert_eq!(decoded["contact"]["phone"], "02-1234-5678");
        assert_eq!(decoded["tags"][1], "pilates");
        assert_eq!(decoded["active"], true);
    }
}
