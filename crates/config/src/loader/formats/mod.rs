//! Document decoders
//!
//! Each format turns bytes into the generic tree the flattener walks: a JSON object.

pub mod json;
mod literal;
pub mod toml;
pub mod yaml;

use serde_json::{Map, Value as JsonValue};

pub type Document = Map<String, JsonValue>;
