// Record projection: raw remote records -> the shape the gallery serves

use serde::Serialize;

use crate::constants;
use crate::remote::RawRecord;

/// The minimal image metadata shape consumed by every engine in this crate.
/// Immutable once projected.
#[derive(Debug, Clone, Serialize)]
pub struct ImageMeta {
    pub key: String,
    pub id: String,
    pub prompt: String,
}

impl ImageMeta {
    /// Numeric form of `id`; absent or non-numeric strings parse as 0.
    pub fn numeric_id(&self) -> u64 {
        self.id.parse().unwrap_or(0)
    }
}

/// Project raw records into [`ImageMeta`], preserving order and length.
///
/// Total function: missing or malformed attributes degrade to empty
/// strings, never an error.
pub fn project(raw: &[RawRecord]) -> Vec<ImageMeta> {
    raw.iter().map(project_one).collect()
}

fn project_one(record: &RawRecord) -> ImageMeta {
    ImageMeta {
        key: record.key.clone(),
        id: attribute_string(record, constants::ATTR_ID),
        prompt: attribute_string(record, constants::ATTR_PROMPT),
    }
}

fn attribute_string(record: &RawRecord, name: &str) -> String {
    record
        .attributes
        .iter()
        .find(|attr| attr.key == name)
        .map(|attr| match &attr.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::Attribute;
    use serde_json::json;

    fn raw(key: &str, attributes: Vec<(&str, serde_json::Value)>) -> RawRecord {
        RawRecord {
            key: key.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(k, value)| Attribute {
                    key: k.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_project_basic() {
        let records = vec![raw(
            "0x1",
            vec![("id", json!("42")), ("prompt", json!("a happy dog"))],
        )];
        let projected = project(&records);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].key, "0x1");
        assert_eq!(projected[0].id, "42");
        assert_eq!(projected[0].prompt, "a happy dog");
        assert_eq!(projected[0].numeric_id(), 42);
    }

    #[test]
    fn test_project_numeric_attribute_stringifies() {
        let records = vec![raw("0x2", vec![("id", json!(7))])];
        let projected = project(&records);
        assert_eq!(projected[0].id, "7");
        assert_eq!(projected[0].numeric_id(), 7);
    }

    #[test]
    fn test_project_missing_prompt_yields_empty_string() {
        let records = vec![raw("0x3", vec![("id", json!("3"))])];
        let projected = project(&records);
        assert_eq!(projected[0].prompt, "");
    }

    #[test]
    fn test_project_no_attributes_at_all() {
        let records = vec![RawRecord {
            key: "0x4".to_string(),
            attributes: Vec::new(),
        }];
        let projected = project(&records);
        assert_eq!(projected[0].id, "");
        assert_eq!(projected[0].prompt, "");
        assert_eq!(projected[0].numeric_id(), 0);
    }

    #[test]
    fn test_non_numeric_id_parses_as_zero() {
        let records = vec![raw("0x5", vec![("id", json!("not-a-number"))])];
        assert_eq!(project(&records)[0].numeric_id(), 0);
    }

    #[test]
    fn test_malformed_attribute_value_degrades() {
        let records = vec![raw("0x6", vec![("prompt", json!({"nested": true}))])];
        assert_eq!(project(&records)[0].prompt, "");
    }
}
