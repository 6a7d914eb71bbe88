//! Wire codec for message bodies.
//!
//! On the wire a body is either one record or an array of records, and it may
//! arrive JSON-encoded inside a string. Inside the crate every body is a list
//! of 1..N records; this module is the only place that knows about the
//! single/array collapsing.

use serde_json::Value;

use crate::validator::ValidationError;

/// Decode a transport payload into structured JSON.
///
/// String payloads are parsed as JSON; anything else is taken as-is.
pub fn parse_payload(payload: &Value) -> Result<Value, ValidationError> {
    match payload {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|e| ValidationError::Malformed(format!("payload is not valid JSON: {}", e))),
        other => Ok(other.clone()),
    }
}

/// Coerce a decoded body into a list of records.
pub fn into_records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(records) => records,
        single => vec![single],
    }
}

/// Collapse a list of records for publishing: a batch of one is sent as the
/// bare record, larger batches as an array.
pub fn encode_batch(mut records: Vec<Value>) -> Value {
    if records.len() == 1 {
        records.remove(0)
    } else {
        Value::Array(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_payload() {
        let parsed = parse_payload(&Value::String("{\"overlayId\":\"a\"}".into())).unwrap();
        assert_eq!(parsed, json!({"overlayId": "a"}));
    }

    #[test]
    fn test_parse_rejects_garbage_string() {
        let err = parse_payload(&Value::String("{not json".into())).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_structured_payload_passes_through() {
        let body = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(parse_payload(&body).unwrap(), body);
    }

    #[test]
    fn test_single_record_becomes_list_of_one() {
        assert_eq!(into_records(json!({"a": 1})), vec![json!({"a": 1})]);
        assert_eq!(into_records(json!([{"a": 1}, {"a": 2}])).len(), 2);
    }

    #[test]
    fn test_encode_collapses_single() {
        assert_eq!(encode_batch(vec![json!({"a": 1})]), json!({"a": 1}));
        assert_eq!(
            encode_batch(vec![json!({"a": 1}), json!({"a": 2})]),
            json!([{"a": 1}, {"a": 2}])
        );
    }
}
