//! Typed configuration options resolved from layered sources
//!
//! This crate provides a registry of declared options with support for:
//! - Typed option kinds (scalars, durations, IPs, URLs, maps and sequences)
//! - Multiple sources (environment, JSON, YAML, TOML documents, command-line flags)
//! - Strict detection of unknown keys and missing required options
//! - Secret options that never show up in dumps or logs
//!
//! # Example
//!
//! ```no_run
//! use tiercfg_config::{required, secret, EnvProvider, FileProvider, Loader, Registry};
//!
//! let mut registry = Registry::new();
//! let host = registry.str("db.host", "localhost", "database host", []);
//! let password = registry.str("db.password", "", "database password", [required(), secret()]);
//!
//! Loader::new()
//!     .with_provider(FileProvider::yaml("config.yaml").optional())
//!     .with_provider(EnvProvider::new().with_prefix("APP"))
//!     .parse(&mut registry)?;
//!
//! println!("{} / {}", host.get(), password.get().len());
//! # Ok::<(), tiercfg_config::ConfigError>(())
//! ```

pub mod error;
pub mod flatten;
pub mod loader;
pub mod provider;
pub mod registry;
pub mod value;

// Re-export main types for convenience
pub use error::{ConfigError, DeclarationError, ErrorFormatter, ProviderError, Result, ValueError};
pub use loader::{
    parse, ArgsProvider, ConfigFormat, EnvProvider, ExplicitProvider, FileProvider, Loader, Report,
};
pub use provider::{stringify, AwaitedKeys, Partition, Provider};
pub use registry::{alias, required, secret, OptionEntry, OptionMeta, Registry};
pub use value::{bind, Handle, Kind, Value};
