//! Environment variable provider
//!
//! A key `a.b.c` with prefix `P` is read from `P_A_B_C`: everything outside
//! `[A-Za-z0-9.]` is dropped, the rest upper-cased and dots become underscores.
//!
//! Examples:
//! - `db.max-conns` with prefix `APP` → `APP_DB_MAXCONNS`
//! - `search.top_k` without prefix → `SEARCH.TOPK` → `SEARCH_TOPK`
//!
//! Variables that are not set are simply not found. The environment cannot be listed
//! against a schema, so this provider never reports unknown keys.

use crate::error::ProviderError;
use crate::provider::{AwaitedKeys, Partition, Provider, Stringify};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static CLEAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9.]+").expect("static pattern compiles"));

/// Environment variable name for `key`
pub fn env_name(prefix: Option<&str>, key: &str) -> String {
    let joined = match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key),
        _ => key.to_string(),
    };
    CLEAN_RE
        .replace_all(&joined, "")
        .to_uppercase()
        .replace('.', "_")
}

#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    prefix: Option<String>,
    dotenv: Option<PathBuf>,
}

impl EnvProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix prepended to every variable name
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Read fallback values from a dotenv file
    ///
    /// The process environment wins over the file; the file is never exported.
    pub fn with_dotenv(mut self, path: impl AsRef<Path>) -> Self {
        self.dotenv = Some(path.as_ref().to_path_buf());
        self
    }

    fn load_dotenv(&self) -> Result<HashMap<String, String>, ProviderError> {
        let Some(path) = &self.dotenv else {
            return Ok(HashMap::new());
        };

        let dotenv_error = |e: dotenvy::Error| ProviderError::Dotenv {
            path: path.clone(),
            message: e.to_string(),
        };

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "dotenv file is absent");
                return Ok(HashMap::new());
            }
            Err(e) => return Err(dotenv_error(e)),
        };

        iter.map(|item| item.map_err(dotenv_error)).collect()
    }
}

impl Provider for EnvProvider {
    fn type_name(&self) -> String {
        "env".to_string()
    }

    fn provide(
        &self,
        awaited: &AwaitedKeys,
        _stringify: Stringify,
    ) -> Result<Partition, ProviderError> {
        let file_vars = self.load_dotenv()?;
        let prefix = self.prefix.as_deref();
        let mut partition = Partition::default();

        for key in awaited.iter() {
            let name = env_name(prefix, key);
            let value = match env::var(&name) {
                Ok(value) => Some(value),
                Err(env::VarError::NotUnicode(_)) => {
                    warn!(var = %name, "ignoring environment variable with non-unicode value");
                    None
                }
                Err(env::VarError::NotPresent) => file_vars.get(&name).cloned(),
            };

            if let Some(value) = value {
                partition.found.insert(key.to_string(), value);
            }
        }

        Ok(partition)
    }
}
