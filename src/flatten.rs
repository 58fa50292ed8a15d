//! Flattening of nested values for the detail lines of pretty output

use serde_json::Value;

/// Flatten a nested value into dot-notation key/value pairs, preserving
/// field order. Array elements get their index as a path segment.
///
/// `{"user": {"name": "Alice"}}` → `[("user.name", "Alice")]`
/// `{"items": ["a", "b"]}` → `[("items.0", "a"), ("items.1", "b")]`
pub fn flatten_pairs(value: &Value) -> Vec<(String, Value)> {
    let mut pairs = Vec::new();
    collect_pairs(value, String::new(), &mut pairs);
    pairs
}

fn collect_pairs(value: &Value, prefix: String, pairs: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(obj) => {
            for (key, value) in obj {
                collect_pairs(value, join_path(&prefix, key), pairs);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                collect_pairs(value, join_path(&prefix, &index.to_string()), pairs);
            }
        }
        leaf => pairs.push((prefix, leaf.clone())),
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects() {
        let pairs = flatten_pairs(&json!({
            "user": {"name": "Alice", "profile": {"age": 30}}
        }));

        assert_eq!(
            pairs,
            vec![
                ("user.name".to_string(), json!("Alice")),
                ("user.profile.age".to_string(), json!(30)),
            ]
        );
    }

    #[test]
    fn flattens_arrays_with_indices() {
        let pairs = flatten_pairs(&json!({"items": ["a", {"b": 1}]}));

        assert_eq!(
            pairs,
            vec![
                ("items.0".to_string(), json!("a")),
                ("items.1.b".to_string(), json!(1)),
            ]
        );
    }

    #[test]
    fn scalars_flatten_to_a_single_unnamed_pair() {
        assert_eq!(flatten_pairs(&json!(42)), vec![("".to_string(), json!(42))]);
    }

    #[test]
    fn empty_containers_produce_no_pairs() {
        assert!(flatten_pairs(&json!({})).is_empty());
        assert!(flatten_pairs(&json!([])).is_empty());
    }
}
