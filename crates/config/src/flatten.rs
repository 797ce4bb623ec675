//! Matching nested documents against awaited dotted keys
//!
//! Walks a decoded tree depth-first, joining keys with `.`:
//!
//! - `null` values are dropped; they appear in neither map.
//! - An awaited mapping is captured whole, as one opaque JSON value, and not descended.
//! - Any other mapping is descended. If no awaited key lies below it, the mapping is
//!   also reported whole under its own path in `unknown`, so an unrecognised block shows
//!   up as a summary next to its individual leaves. Mappings on the way to an awaited key
//!   are never reported.
//! - Scalars and arrays are leaves; array items are not addressable.

use crate::provider::{AwaitedKeys, Partition, Stringify};
use serde_json::{Map, Value as JsonValue};

/// Per-call flattening state
pub struct Flattener<'a> {
    awaited: &'a AwaitedKeys,
    stringify: Stringify,
    partition: Partition,
}

impl<'a> Flattener<'a> {
    pub fn new(awaited: &'a AwaitedKeys, stringify: Stringify) -> Self {
        Self {
            awaited,
            stringify,
            partition: Partition::default(),
        }
    }

    /// Flatten `root` and return the collected partition
    pub fn flatten(mut self, root: &Map<String, JsonValue>) -> Partition {
        self.visit(root, "");
        self.partition
    }

    fn visit(&mut self, level: &Map<String, JsonValue>, prefix: &str) {
        for (key, value) in level {
            if value.is_null() {
                continue;
            }

            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            if self.awaited.contains(&path) {
                let text = (self.stringify)(value);
                self.partition.found.insert(path, text);
                continue;
            }

            match value {
                JsonValue::Object(subtree) => {
                    if !self.awaited.is_ancestor(&path) {
                        let text = (self.stringify)(value);
                        self.partition.unknown.insert(path.clone(), text);
                    }
                    self.visit(subtree, &path);
                }
                leaf => {
                    let text = (self.stringify)(leaf);
                    self.partition.unknown.insert(path, text);
                }
            }
        }
    }
}

/// Flatten `root` against `awaited` in one call
pub fn flatten(
    root: &Map<String, JsonValue>,
    awaited: &AwaitedKeys,
    stringify: Stringify,
) -> Partition {
    Flattener::new(awaited, stringify).flatten(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::stringify;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn run(doc: JsonValue, awaited: &[&str]) -> Partition {
        let awaited: AwaitedKeys = awaited.iter().copied().collect();
        let root = doc.as_object().cloned().unwrap();
        flatten(&root, &awaited, stringify)
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_key_value() {
        let p = run(json!({"str": "name", "int": 1}), &["str"]);
        assert_eq!(p.found, map(&[("str", "name")]));
        assert_eq!(p.unknown, map(&[("int", "1")]));
    }

    #[test]
    fn test_nested_with_ancestor_suppression() {
        let doc = json!({
            "host": "localhost",
            "database": {
                "port": 5432,
                "credentials": {"username": "admin"}
            }
        });
        let p = run(doc, &["database.credentials.username"]);
        assert_eq!(p.found, map(&[("database.credentials.username", "admin")]));
        assert_eq!(p.unknown, map(&[("host", "localhost"), ("database.port", "5432")]));
    }

    #[test]
    fn test_array_is_opaque_leaf() {
        let p = run(json!({"tags": ["a", "b"], "other": [1, {"x": 2}]}), &["tags"]);
        assert_eq!(p.found, map(&[("tags", r#"["a","b"]"#)]));
        assert_eq!(p.unknown, map(&[("other", r#"[1,{"x":2}]"#)]));
    }

    #[test]
    fn test_awaited_mapping_is_captured_whole() {
        let p = run(json!({"options": {"k1": 1, "k2": "v2"}}), &["options"]);
        assert_eq!(p.found, map(&[("options", r#"{"k1":1,"k2":"v2"}"#)]));
        assert!(p.unknown.is_empty());
    }

    #[test]
    fn test_awaited_mapping_stops_descent() {
        let p = run(
            json!({"a": {"b": {"c": {"deep": 1}}}}),
            &["a.b.c", "a.b.c.deep"],
        );
        assert_eq!(p.found, map(&[("a.b.c", r#"{"deep":1}"#)]));
        assert!(p.unknown.is_empty());
    }

    #[test]
    fn test_null_elision() {
        let p = run(
            json!({"key1": "value1", "key2": null, "key3": 123, "loose": null, "obj": {"n": null}}),
            &["key1", "key2", "key3"],
        );
        assert_eq!(p.found, map(&[("key1", "value1"), ("key3", "123")]));
        assert_eq!(p.unknown, map(&[("obj", r#"{"n":null}"#)]));
    }

    #[test]
    fn test_unknown_subtree_reported_whole_and_by_leaf() {
        let p = run(
            json!({"name": "svc", "x": {"y": 1, "z": {"w": true}}}),
            &["name"],
        );
        assert_eq!(p.found, map(&[("name", "svc")]));
        assert_eq!(
            p.unknown,
            map(&[
                ("x", r#"{"y":1,"z":{"w":true}}"#),
                ("x.y", "1"),
                ("x.z", r#"{"w":true}"#),
                ("x.z.w", "true"),
            ])
        );
    }

    #[test]
    fn test_ancestor_of_missing_key_is_not_unknown() {
        let p = run(json!({"db": {"extra": "1"}}), &["db.host"]);
        assert!(p.found.is_empty());
        assert_eq!(p.unknown, map(&[("db.extra", "1")]));
    }

    #[test]
    fn test_empty_unknown_mapping() {
        let p = run(json!({"empty": {}}), &[]);
        assert_eq!(p.unknown, map(&[("empty", "{}")]));
    }

    #[test]
    fn test_deterministic() {
        let doc = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x", "e": {"f": {"g": 1.5}}});
        let first = run(doc.clone(), &["a.b", "e.f"]);
        for _ in 0..10 {
            assert_eq!(run(doc.clone(), &["a.b", "e.f"]), first);
        }
    }
}
