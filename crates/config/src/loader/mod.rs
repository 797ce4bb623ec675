//! Resolution of declared options from layered sources
//!
//! Sources are applied in the order they were added, and a later source overrides an
//! earlier one:
//!
//! defaults < first provider < ... < last provider

pub mod args;
pub mod env;
pub mod explicit;
pub mod file;
pub mod formats;
mod merge;

use crate::error::{ConfigError, Result};
use crate::provider::{stringify, Provider};
use crate::registry::Registry;
use merge::Merger;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub use args::ArgsProvider;
pub use env::EnvProvider;
pub use explicit::ExplicitProvider;
pub use file::{detect_format, ConfigFormat, FileProvider, Locator};

/// Outcome of a successful resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Option name → provider that supplied its final value
    pub origins: BTreeMap<String, String>,
    /// Unknown key → provider, collected in lenient mode
    pub ignored: BTreeMap<String, String>,
}

/// Builder for a resolution pass
///
/// # Example
///
/// ```no_run
/// use tiercfg_config::{Loader, Registry};
///
/// let mut registry = Registry::new();
/// let port = registry.uint32("server.port", 8080, "listen port", []);
///
/// Loader::new()
///     .with_file("tiercfg.yaml")      // Base config
///     .with_env("APP")                // Env var overlay
///     .with_args()                    // Command-line flags
///     .parse(&mut registry)?;
///
/// println!("port = {}", port.get());
/// # Ok::<(), tiercfg_config::ConfigError>(())
/// ```
pub struct Loader {
    providers: Vec<Box<dyn Provider>>,
    strict: bool,
}

impl Loader {
    /// Create a strict loader with no providers
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            strict: true,
        }
    }

    pub fn with_provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Add a document source; the format comes from the extension
    pub fn with_file(self, locator: impl Into<String>) -> Self {
        self.with_provider(FileProvider::detect(locator))
    }

    /// Add environment variables, with an optional name prefix
    pub fn with_env(self, prefix: &str) -> Self {
        let provider = if prefix.is_empty() {
            EnvProvider::new()
        } else {
            EnvProvider::new().with_prefix(prefix)
        };
        self.with_provider(provider)
    }

    /// Add the process command-line flags
    pub fn with_args(self) -> Self {
        self.with_provider(ArgsProvider::from_env())
    }

    /// Log unknown keys instead of failing on them
    pub fn lenient(self) -> Self {
        self.strict(false)
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Run every provider in order against `registry`
    ///
    /// A provider failure or an unparsable value stops the pass at once. Unknown keys
    /// (strict mode) and missing required options are returned together as
    /// [`ConfigError::Violations`].
    pub fn parse(&self, registry: &mut Registry) -> Result<Report> {
        let providers: Vec<&dyn Provider> = self.providers.iter().map(|p| p.as_ref()).collect();
        resolve(registry, &providers, self.strict)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Strict resolution pass over `providers`, lowest precedence first
pub fn parse(registry: &mut Registry, providers: &[&dyn Provider]) -> Result<Report> {
    resolve(registry, providers, true)
}

fn resolve(registry: &mut Registry, providers: &[&dyn Provider], strict: bool) -> Result<Report> {
    let mut merger = Merger::new(registry, strict);

    for provider in providers {
        let name = provider.type_name();
        let partition = provider
            .provide(merger.awaited(), stringify)
            .map_err(|source| ConfigError::Provider {
                provider: name.clone(),
                source,
            })?;
        debug!(
            provider = %name,
            found = partition.found.len(),
            unknown = partition.unknown.len(),
            "provider resolved"
        );
        merger.apply(&name, partition)?;
    }

    merger.finish()
}
