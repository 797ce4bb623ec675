//! Command-line flag provider
//!
//! Recognised forms are `--key=value`, `-key=value` and a bare `--key`, which supplies
//! the empty text (a boolean reads it as true). `--` ends flag parsing, and tokens that
//! do not start with a dash are skipped. A repeated flag keeps its last value.

use crate::error::ProviderError;
use crate::provider::{AwaitedKeys, Partition, Provider, Stringify};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct ArgsProvider {
    args: Vec<String>,
}

impl ArgsProvider {
    /// Flags from an explicit argument list (without the program name)
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Flags from the process arguments
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    fn flags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.args
            .iter()
            .take_while(|arg| arg.as_str() != "--")
            .filter_map(|arg| {
                let flag = arg
                    .strip_prefix("--")
                    .or_else(|| arg.strip_prefix('-'))?;
                let (key, value) = flag.split_once('=').unwrap_or((flag, ""));
                if key.is_empty() {
                    trace!(arg = %arg, "skipping malformed flag");
                    return None;
                }
                Some((key, value))
            })
    }
}

impl Provider for ArgsProvider {
    fn type_name(&self) -> String {
        "args".to_string()
    }

    fn provide(
        &self,
        awaited: &AwaitedKeys,
        _stringify: Stringify,
    ) -> Result<Partition, ProviderError> {
        let mut partition = Partition::default();
        for (key, value) in self.flags() {
            let target = if awaited.contains(key) {
                &mut partition.found
            } else {
                &mut partition.unknown
            };
            target.insert(key.to_string(), value.to_string());
        }
        Ok(partition)
    }
}
