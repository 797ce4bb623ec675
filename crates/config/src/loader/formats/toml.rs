//! TOML format parser

use super::literal::{LiteralSource, Restore};
use super::Document;
use crate::error::ProviderError;
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny};
use serde::Deserialize;
use serde_json::{Number, Value as JsonValue};
use ::toml::Value as TomlValue;
use tracing::debug;

/// Parse a TOML document
pub fn parse(content: &str) -> Result<Document, ProviderError> {
    parse_with_path(content, None)
}

/// Parse a TOML document with its locator for better errors
///
/// Datetimes become their RFC 3339 text. Numbers keep the text they were written with.
pub fn parse_with_path(content: &str, path: Option<&str>) -> Result<Document, ProviderError> {
    let table: ::toml::Table = ::toml::from_str(content)
        .map_err(|e| ProviderError::from_toml_error(e, content, path))?;
    let mut root = JsonValue::Object(
        table
            .into_iter()
            .map(|(key, value)| (key, to_json(value)))
            .collect(),
    );

    let seed = Restore {
        node: &mut root,
        source: &TomlLiterals { content },
    };
    if let Err(e) = seed.deserialize(::toml::Deserializer::new(content)) {
        debug!(error = %e, "keeping decoded numbers for toml document");
    }

    match root {
        JsonValue::Object(root) => Ok(root),
        _ => Ok(Document::new()),
    }
}

struct TomlLiterals<'a> {
    content: &'a str,
}

impl LiteralSource for TomlLiterals<'_> {
    fn number_text<'de, D>(&self, deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let spanned = ::toml::Spanned::<IgnoredAny>::deserialize(deserializer)?;
        Ok(self.content.get(spanned.span()).map(str::to_owned))
    }
}

fn to_json(value: TomlValue) -> JsonValue {
    match value {
        TomlValue::String(s) => JsonValue::String(s),
        TomlValue::Integer(i) => JsonValue::from(i),
        TomlValue::Float(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(f.to_string())),
        TomlValue::Boolean(b) => JsonValue::Bool(b),
        TomlValue::Datetime(dt) => JsonValue::String(dt.to_string()),
        TomlValue::Array(items) => JsonValue::Array(items.into_iter().map(to_json).collect()),
        TomlValue::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, to_json(value)))
                .collect(),
        ),
    }
}
