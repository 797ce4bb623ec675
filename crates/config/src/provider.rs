//! Source adapter contract
//!
//! A provider is handed the awaited key set and returns two flat maps: `found` for keys
//! that were asked for and `unknown` for everything else the source contained. Absent
//! sources answer with an empty [`Partition`], never an error.

use crate::error::ProviderError;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Canonical text conversion applied to decoded document values
pub type Stringify = fn(&JsonValue) -> String;

/// Strings are passed through raw; everything else is compact JSON with number
/// literals kept as written.
pub fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Option names and aliases a resolution pass asks every provider for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwaitedKeys(BTreeSet<String>);

impl AwaitedKeys {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// True when some awaited key lies strictly below `path`
    pub fn is_ancestor(&self, path: &str) -> bool {
        let prefix = format!("{}.", path);
        self.0
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|key| key.starts_with(&prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AwaitedKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Matched and unmatched flat key/text pairs of one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub found: BTreeMap<String, String>,
    pub unknown: BTreeMap<String, String>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.found.is_empty() && self.unknown.is_empty()
    }
}

/// A source of raw option text
///
/// Implementations only read their source: calling [`Provider::provide`] twice with
/// different key sets gives independent answers.
pub trait Provider {
    /// Self-description used in diagnostics, including any locator (`json[cfg.json]`)
    fn type_name(&self) -> String;

    fn provide(&self, awaited: &AwaitedKeys, stringify: Stringify)
        -> Result<Partition, ProviderError>;
}
