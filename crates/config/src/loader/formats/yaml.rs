//! YAML format parser
//!
//! Documents are decoded straight into the JSON tree instead of `serde_yaml::Value`:
//!
//! - Mapping keys are read as their scalar text (`80`, `true`, `1.10`); sequence or
//!   mapping keys are malformed.
//! - A key repeated in one mapping keeps its last value.
//! - Integers wider than 64 bits are kept, and every number keeps the text it was
//!   written with (see [`super::literal`]).
//! - Custom tags are dropped and their value kept.

use super::literal::{LiteralSource, Restore, ScalarText};
use super::Document;
use crate::error::ProviderError;
use serde::de::{self, DeserializeSeed, Deserializer, EnumAccess, IgnoredAny, MapAccess};
use serde::de::{SeqAccess, VariantAccess, Visitor};
use serde::Deserialize;
use serde_json::{Number, Value as JsonValue};
use std::fmt;
use tracing::debug;

/// Parse a YAML document whose root must be a mapping
pub fn parse(content: &str) -> Result<Document, ProviderError> {
    parse_with_path(content, None)
}

/// Parse a YAML document with its locator for better errors
///
/// A document that is only `~` decodes to an empty mapping.
pub fn parse_with_path(content: &str, path: Option<&str>) -> Result<Document, ProviderError> {
    let Tree(mut root) = serde_yaml::from_str(content)
        .map_err(|e| ProviderError::from_yaml_error(e, content, path))?;

    let seed = Restore {
        node: &mut root,
        source: &YamlLiterals,
    };
    if let Err(e) = seed.deserialize(serde_yaml::Deserializer::from_str(content)) {
        debug!(error = %e, "keeping decoded numbers for yaml document");
    }

    match root {
        JsonValue::Object(root) => Ok(root),
        JsonValue::Null => Ok(Document::new()),
        _ => Err(ProviderError::RootNotMapping { format: "yaml" }),
    }
}

struct YamlLiterals;

impl LiteralSource for YamlLiterals {
    fn number_text<'de, D>(&self, deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Plain scalars are handed over as written when asked for a string.
        deserializer.deserialize_str(ScalarText)
    }
}

struct Tree(JsonValue);

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TreeVisitor).map(Tree)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        Ok(JsonValue::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<JsonValue, E> {
        wide_integer(v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<JsonValue, E> {
        wide_integer(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        // .inf and .nan have no JSON number form.
        Ok(Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JsonValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Tree::deserialize(deserializer).map(|tree| tree.0)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(Tree(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Document::new();
        while let Some(key) = map.next_key::<String>()? {
            let Tree(value) = map.next_value()?;
            object.insert(key, value);
        }
        Ok(JsonValue::Object(object))
    }

    fn visit_enum<A>(self, data: A) -> Result<JsonValue, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (IgnoredAny, variant) = data.variant::<IgnoredAny>()?;
        variant.newtype_variant::<Tree>().map(|tree| tree.0)
    }
}

fn wide_integer<E: de::Error>(text: String) -> Result<JsonValue, E> {
    text.parse::<Number>().map(JsonValue::Number).map_err(E::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
search:
  mode: hybrid
  top_k: 5
"#;
        let root = parse(yaml).unwrap();
        assert_eq!(root["search"]["mode"], JsonValue::String("hybrid".into()));
        assert_eq!(root["search"]["top_k"].to_string(), "5");
    }

    #[test]
    fn test_scalar_keys_become_text() {
        let root = parse("ports:\n  80: http\n  true: yes\n").unwrap();
        assert_eq!(root["ports"]["80"], JsonValue::String("http".into()));
        assert!(root["ports"].get("true").is_some());
    }

    #[test]
    fn test_sequences_and_nulls() {
        let root = parse("tags: [a, b]\nmissing: ~\n").unwrap();
        assert_eq!(root["tags"].to_string(), r#"["a","b"]"#);
        assert!(root["missing"].is_null());
    }

    #[test]
    fn test_null_document_is_empty() {
        assert!(parse("~").unwrap().is_empty());
    }

    #[test]
    fn test_root_not_mapping() {
        let err = parse("- a\n- b\n").unwrap_err();
        assert_eq!(err.to_string(), "yaml root is not an object");
    }

    #[test]
    fn test_complex_key_is_malformed() {
        let err = parse("? [a, b]\n: value\n").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { format: "yaml", .. }));
    }

    #[test]
    fn test_numbers_keep_literal_text() {
        let yaml = "version: 1.10\nratio: 1e3\nbig: 12345678901234567890123\nlist: [2.50, 7]\n";
        let root = parse(yaml).unwrap();
        assert_eq!(root["version"].to_string(), "1.10");
        assert_eq!(root["ratio"].to_string(), "1e3");
        assert_eq!(root["big"].to_string(), "12345678901234567890123");
        assert_eq!(root["list"].to_string(), "[2.50,7]");
    }

    #[test]
    fn test_non_json_number_forms_keep_decoded_value() {
        let root = parse("hex: 0x1F\ninf: .inf\n").unwrap();
        assert_eq!(root["hex"].to_string(), "31");
        assert_eq!(root["inf"], JsonValue::String("inf".into()));
    }

    #[test]
    fn test_duplicate_key_keeps_last_value() {
        let root = parse("a: 1\nb: x\na: 2\n").unwrap();
        assert_eq!(root["a"].to_string(), "2");
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_tagged_value_is_unwrapped() {
        let root = parse("secret: !vault abc\n").unwrap();
        assert_eq!(root["secret"], JsonValue::String("abc".into()));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_with_path("a: [unclosed", Some("cfg.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse yaml document in cfg.yaml"));
    }
}
