use super::{Kind, Sealed};
use crate::error::ValueError;
use serde_json::Value as JsonValue;

/// Free-form object option
pub type Map = serde_json::Map<String, JsonValue>;

impl Sealed for Map {}

impl Kind for Map {
    const TYPE: &'static str = "map";

    fn parse(text: &str) -> Result<Self, ValueError> {
        if text.is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(text) {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(_) => Err(ValueError::new(Self::TYPE, text, "expected a JSON object")),
            Err(e) => Err(ValueError::new(Self::TYPE, text, e)),
        }
    }

    fn render(&self) -> String {
        JsonValue::Object(self.clone()).to_string()
    }

    fn zero() -> Self {
        Map::new()
    }
}
