//! Field merging for launch template data.

use serde_json::{Map, Value};

/// Shallow union of `original` and `overrides`, overrides winning.
///
/// Keys keep their position from `original`; keys only present in `overrides` are
/// appended in their own order. Nested objects are replaced, never merged.
pub fn merge_fields(original: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = original.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_overrides_win() {
        let merged = merge_fields(
            &object(json!({"a": 1, "b": 2})),
            &object(json!({"b": 3, "c": 4})),
        );
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_nested_objects_are_replaced() {
        let merged = merge_fields(
            &object(json!({"tags": {"x": 1}})),
            &object(json!({"tags": {"y": 2}})),
        );
        assert_eq!(Value::Object(merged), json!({"tags": {"y": 2}}));
    }

    #[test]
    fn test_key_order() {
        let merged = merge_fields(
            &object(json!({"ImageId": "ami-1", "InstanceType": "t3.micro"})),
            &object(json!({"KeyName": "ops", "ImageId": "ami-2"})),
        );
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ImageId", "InstanceType", "KeyName"]);
    }

    #[test]
    fn test_empty_overrides() {
        let original = object(json!({"InstanceType": "t3.micro"}));
        assert_eq!(merge_fields(&original, &Map::new()), original);
    }
}
