//! Accessors over decoded XML trees.
//!
//! Decoded documents follow the attribute/text convention: attributes are
//! `@name` keys, mixed text is `#text`, a repeated element is an array and a
//! single one is an object. These helpers hide that irregularity.

use serde_json::Value;

/// View a node as a list: arrays yield their items, null yields nothing,
/// anything else is a one-element list.
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Non-null child of an object node.
pub fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Text content of a node, trimmed.
///
/// Objects contribute their `#text`; arrays are joined line by line.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map.get("#text").map(text_of).unwrap_or_default(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Bool(_) | Value::Null => String::new(),
    }
}

/// First non-empty text among `keys` of an object node.
pub fn first_text(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| child(value, k))
        .map(text_of)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_list_shapes() {
        assert!(as_list(&Value::Null).is_empty());
        assert_eq!(as_list(&json!({"a": 1})).len(), 1);
        assert_eq!(as_list(&json!([1, 2, 3])).len(), 3);
    }

    #[test]
    fn test_text_of_variants() {
        assert_eq!(text_of(&json!("  본문 ")), "본문");
        assert_eq!(text_of(&json!(12)), "12");
        assert_eq!(text_of(&json!({"@조문번호": "1", "#text": "내용"})), "내용");
        assert_eq!(text_of(&json!(["가", "", "나"])), "가\n나");
        assert_eq!(text_of(&json!({"항": "x"})), "");
    }

    #[test]
    fn test_first_text_skips_empty() {
        let node = json!({"법령명한글": "", "LawName": "도로교통법"});
        assert_eq!(first_text(&node, &["법령명한글", "LawName"]), "도로교통법");
        assert_eq!(first_text(&node, &["없음"]), "");
    }
}
