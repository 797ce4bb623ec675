//! Option schema files
//!
//! ```yaml
//! options:
//!   - name: db.host
//!     type: string
//!     default: localhost
//!     description: database host
//!   - name: db.password
//!     type: string
//!     required: true
//!     secret: true
//!     aliases: [database.password]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use tiercfg_config::{alias, required, secret, stringify, OptionMeta, Registry};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub options: Vec<SchemaEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal in the option's own grammar; structured values are read as compact JSON
    #[serde(default)]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl SchemaEntry {
    fn flags(&self) -> Vec<OptionMeta> {
        let mut flags: Vec<OptionMeta> = self.aliases.iter().map(alias).collect();
        if self.required {
            flags.push(required());
        }
        if self.secret {
            flags.push(secret());
        }
        flags
    }
}

impl Schema {
    /// Read a schema; `.json` is JSON, `.yml`/`.yaml` is YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema {}", path.display()))?;
        let schema = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("invalid schema {}", path.display()))?,
            Some("yml") | Some("yaml") => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid schema {}", path.display()))?,
            _ => bail!(
                "unknown schema format for {}\nSupported formats: .yml, .yaml, .json",
                path.display()
            ),
        };
        Ok(schema)
    }

    /// Declare every option into a fresh registry
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for entry in &self.options {
            let default = entry.default.as_ref().map(stringify);
            registry
                .declare_tagged(
                    &entry.kind,
                    &entry.name,
                    default.as_deref(),
                    &entry.description,
                    entry.flags(),
                )
                .with_context(|| format!("schema entry '{}'", entry.name))?;
        }
        debug!(options = registry.len(), "declared schema options");
        Ok(registry)
    }
}
