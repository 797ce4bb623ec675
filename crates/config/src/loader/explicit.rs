//! Explicit in-memory document, for programmatic overrides

use crate::error::ProviderError;
use crate::flatten::flatten;
use crate::provider::{AwaitedKeys, Partition, Provider, Stringify};
use serde_json::Value as JsonValue;

/// Provider over an already-built JSON tree
#[derive(Debug, Clone)]
pub struct ExplicitProvider {
    name: String,
    document: JsonValue,
}

impl ExplicitProvider {
    pub fn new(document: JsonValue) -> Self {
        Self::named("explicit", document)
    }

    pub fn named(name: impl Into<String>, document: JsonValue) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

impl Provider for ExplicitProvider {
    fn type_name(&self) -> String {
        self.name.clone()
    }

    fn provide(
        &self,
        awaited: &AwaitedKeys,
        stringify: Stringify,
    ) -> Result<Partition, ProviderError> {
        match &self.document {
            JsonValue::Object(root) => Ok(flatten(root, awaited, stringify)),
            JsonValue::Null => Ok(Partition::default()),
            _ => Err(ProviderError::RootNotMapping { format: "explicit" }),
        }
    }
}
