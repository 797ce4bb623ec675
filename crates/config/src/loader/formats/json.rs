//! JSON format parser

use super::Document;
use crate::error::ProviderError;
use serde_json::Value as JsonValue;

/// Parse a JSON document whose root must be an object
pub fn parse(content: &str) -> Result<Document, ProviderError> {
    parse_with_path(content, None)
}

/// Parse a JSON document with its locator for better errors
///
/// Numbers keep their literal text (`1.50` stays `1.50`).
pub fn parse_with_path(content: &str, path: Option<&str>) -> Result<Document, ProviderError> {
    match serde_json::from_str(content) {
        Ok(JsonValue::Object(root)) => Ok(root),
        Ok(_) => Err(ProviderError::RootNotMapping { format: "json" }),
        Err(e) => Err(ProviderError::from_json_error(e, content, path)),
    }
}
