use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::db::store::Document;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn encode_body(fields: &Document) -> Result<String> {
    serde_json::to_string(fields).context("failed to serialize document body")
}

pub fn decode_body(raw: &str, key: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(raw)
        .with_context(|| format!("document {key} holds invalid JSON"))?
    {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!(
            "document {key} is not a JSON object (found {})",
            kind_of(&other)
        )),
    }
}

/// Overwrite the fields present in `patch`, keep everything else.
pub fn merge_into(target: &mut Document, patch: Document) {
    for (field, value) in patch {
        target.insert(field, value);
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_rejects_non_objects() {
        assert!(decode_body("[1,2]", "users/1").is_err());
        assert!(decode_body("not json", "users/1").is_err());
        let doc = decode_body(r#"{"name":"Ravi"}"#, "users/1").unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Ravi")));
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut target = json!({"name": "Ravi", "showSkipButton": false})
            .as_object()
            .cloned()
            .unwrap();
        let patch = json!({"showSkipButton": true}).as_object().cloned().unwrap();
        merge_into(&mut target, patch);
        assert_eq!(target.get("name"), Some(&json!("Ravi")));
        assert_eq!(target.get("showSkipButton"), Some(&json!(true)));
    }

    #[test]
    fn parse_datetime_reports_field() {
        let err = parse_datetime("yesterday", "updated_at").unwrap_err();
        assert!(err.to_string().contains("updated_at"));
    }
}
