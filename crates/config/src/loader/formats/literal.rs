//! Second decoding pass that puts number literals back as written
//!
//! Format crates hand numbers over as `i64`/`u64`/`f64`, so `1.10` would come back as
//! `1.1`. After a document is decoded, the same source is walked again alongside the
//! decoded tree. Each number leaf is replaced by the source text of that literal, when
//! the text is also valid JSON number syntax (`0x1F` or `1_000` keep the decoded value).

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// How a format exposes the source text of a number
pub(crate) trait LiteralSource {
    fn number_text<'de, D>(&self, deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>;
}

/// Seed that walks one decoded node against the source
pub(crate) struct Restore<'a, S> {
    pub(crate) node: &'a mut JsonValue,
    pub(crate) source: &'a S,
}

impl<'de, S: LiteralSource> DeserializeSeed<'de> for Restore<'_, S> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = self.source;
        match self.node {
            JsonValue::Object(map) => deserializer.deserialize_map(MapRestore { map, source }),
            JsonValue::Array(items) => deserializer.deserialize_seq(SeqRestore { items, source }),
            JsonValue::Number(number) => {
                let text = source.number_text(deserializer)?;
                if let Some(literal) = text.and_then(|t| t.trim().parse::<Number>().ok()) {
                    *number = literal;
                }
                Ok(())
            }
            _ => IgnoredAny::deserialize(deserializer).map(drop),
        }
    }
}

struct MapRestore<'a, S> {
    map: &'a mut serde_json::Map<String, JsonValue>,
    source: &'a S,
}

impl<'de, S: LiteralSource> Visitor<'de> for MapRestore<'_, S> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A>(self, mut access: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = access.next_key::<String>()? {
            match self.map.get_mut(&key) {
                Some(node) => access.next_value_seed(Restore {
                    node,
                    source: self.source,
                })?,
                None => {
                    access.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(())
    }
}

struct SeqRestore<'a, S> {
    items: &'a mut Vec<JsonValue>,
    source: &'a S,
}

impl<'de, S: LiteralSource> Visitor<'de> for SeqRestore<'_, S> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        for node in self.items.iter_mut() {
            let seed = Restore {
                node,
                source: self.source,
            };
            if access.next_element_seed(seed)?.is_none() {
                return Ok(());
            }
        }
        while access.next_element::<IgnoredAny>()?.is_some() {}
        Ok(())
    }
}

/// Reads a scalar as its plain text; anything else has no literal
pub(crate) struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Reads every number from a JSON source as its text
    struct JsonText;

    impl LiteralSource for JsonText {
        fn number_text<'de, D>(&self, deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let number = Number::deserialize(deserializer)?;
            Ok(Some(number.to_string()))
        }
    }

    #[test]
    fn test_restores_nested_numbers() {
        let source = r#"{"a": {"b": 1.10}, "list": [1e3, "x", {"c": 2.50}], "s": "1.0"}"#;
        let mut tree = json!({"a": {"b": 1.1}, "list": [1000.0, "x", {"c": 2.5}], "s": "1.0"});

        let mut de = serde_json::Deserializer::from_str(source);
        Restore {
            node: &mut tree,
            source: &JsonText,
        }
        .deserialize(&mut de)
        .unwrap();

        assert_eq!(tree["a"]["b"].to_string(), "1.10");
        assert_eq!(tree["list"][0].to_string(), "1e3");
        assert_eq!(tree["list"][2]["c"].to_string(), "2.50");
        assert_eq!(tree["s"], "1.0");
    }
}
