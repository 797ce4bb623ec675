//! Applying provider partitions to the registry
//!
//! Providers are applied in order and every `found` text is committed immediately, so a
//! later provider overwrites an earlier one. Unknown keys and missing required options are
//! collected across the whole pass and reported together by [`Merger::finish`].

use super::Report;
use crate::error::{suggest_key, ConfigError, Violation, Violations};
use crate::provider::{AwaitedKeys, Partition};
use crate::registry::Registry;
use std::collections::HashSet;
use tracing::{trace, warn};

pub(crate) struct Merger<'r> {
    registry: &'r mut Registry,
    awaited: AwaitedKeys,
    strict: bool,
    supplied: HashSet<String>,
    violations: Vec<Violation>,
    report: Report,
}

impl<'r> Merger<'r> {
    pub(crate) fn new(registry: &'r mut Registry, strict: bool) -> Self {
        let awaited = registry.awaited_keys();
        Self {
            registry,
            awaited,
            strict,
            supplied: HashSet::new(),
            violations: Vec::new(),
            report: Report::default(),
        }
    }

    pub(crate) fn awaited(&self) -> &AwaitedKeys {
        &self.awaited
    }

    /// Commit one provider's partition
    ///
    /// Aliases are applied before canonical names so the canonical key wins inside a
    /// single provider. A text that does not parse stops the pass.
    pub(crate) fn apply(
        &mut self,
        provider: &str,
        partition: Partition,
    ) -> Result<(), ConfigError> {
        let Partition { found, mut unknown } = partition;

        let (canonical, aliased): (Vec<_>, Vec<_>) = found.into_iter().partition(|(key, _)| {
            self.registry
                .entry(key)
                .map_or(true, |entry| entry.name() == key.as_str())
        });

        for (key, text) in aliased.into_iter().chain(canonical) {
            let Some(entry) = self.registry.entry_mut(&key) else {
                // A provider answered with a key nobody declared.
                unknown.insert(key, text);
                continue;
            };

            entry
                .set(&text, provider)
                .map_err(|source| ConfigError::InvalidValue {
                    key: key.clone(),
                    provider: provider.to_string(),
                    source,
                })?;

            let name = entry.name().to_string();
            if entry.is_secret() {
                trace!(option = %name, provider, "set secret option");
            } else {
                trace!(option = %name, provider, value = %text, "set option");
            }
            self.report.origins.insert(name.clone(), provider.to_string());
            self.supplied.insert(name);
        }

        for key in unknown.into_keys() {
            if self.awaited.contains(&key) {
                continue;
            }
            if self.strict {
                let hint = suggest_key(&key, self.awaited.iter());
                self.violations.push(Violation::UnknownKey {
                    key,
                    provider: provider.to_string(),
                    hint,
                });
            } else {
                warn!(key = %key, provider, "ignoring unknown configuration key");
                self.report.ignored.insert(key, provider.to_string());
            }
        }

        Ok(())
    }

    /// Close the pass: fail with every violation found, or return the report
    pub(crate) fn finish(mut self) -> Result<Report, ConfigError> {
        for entry in self.registry.entries() {
            if entry.is_required() && !self.supplied.contains(entry.name()) {
                self.violations.push(Violation::MissingRequired {
                    key: entry.name().to_string(),
                });
            }
        }

        if self.violations.is_empty() {
            Ok(self.report)
        } else {
            Err(ConfigError::Violations(Violations(self.violations)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{alias, required, secret};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn partition(found: &[(&str, &str)], unknown: &[(&str, &str)]) -> Partition {
        let map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        Partition {
            found: map(found),
            unknown: map(unknown),
        }
    }

    #[test]
    fn test_later_provider_overwrites() {
        let mut registry = Registry::new();
        let level = registry.str("log.level", "info", "", []);

        let mut merger = Merger::new(&mut registry, true);
        merger.apply("first", partition(&[("log.level", "debug")], &[])).unwrap();
        merger.apply("second", partition(&[("log.level", "warn")], &[])).unwrap();
        let report = merger.finish().unwrap();

        assert_eq!(level.get(), "warn");
        assert_eq!(report.origins["log.level"], "second");
        assert_eq!(registry.entry("log.level").unwrap().origin(), Some("second"));
    }

    #[test]
    fn test_canonical_name_beats_alias() {
        let mut registry = Registry::new();
        let host = registry.str("db.host", "", "", [alias("database.host")]);

        let mut merger = Merger::new(&mut registry, true);
        merger
            .apply(
                "json",
                partition(&[("db.host", "canonical"), ("database.host", "aliased")], &[]),
            )
            .unwrap();
        merger.finish().unwrap();

        assert_eq!(host.get(), "canonical");
    }

    #[test]
    fn test_alias_supplies_required_option() {
        let mut registry = Registry::new();
        let host = registry.str("db.host", "", "", [alias("database.host"), required()]);

        let mut merger = Merger::new(&mut registry, true);
        merger.apply("env", partition(&[("database.host", "h")], &[])).unwrap();
        let report = merger.finish().unwrap();

        assert_eq!(host.get(), "h");
        assert_eq!(report.origins["db.host"], "env");
    }

    #[test]
    fn test_invalid_text_stops_pass() {
        let mut registry = Registry::new();
        registry.bool("debug", false, "", []);

        let mut merger = Merger::new(&mut registry, true);
        let err = merger
            .apply("args", partition(&[("debug", "maybe")], &[]))
            .unwrap_err();

        match err {
            ConfigError::InvalidValue { key, provider, source } => {
                assert_eq!(key, "debug");
                assert_eq!(provider, "args");
                assert_eq!(source.text, "maybe");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_violations_are_collected_across_providers() {
        let mut registry = Registry::new();
        registry.str("db.host", "", "", []);
        registry.str("db.password", "", "", [required(), secret()]);

        let mut merger = Merger::new(&mut registry, true);
        merger.apply("json[a.json]", partition(&[], &[("db.hots", "x")])).unwrap();
        merger.apply("yaml[b.yaml]", partition(&[], &[("extra", "1")])).unwrap();
        let err = merger.finish().unwrap_err();

        assert_eq!(
            err.violations(),
            [
                Violation::UnknownKey {
                    key: "db.hots".into(),
                    provider: "json[a.json]".into(),
                    hint: Some("did you mean 'db.host'?".into()),
                },
                Violation::UnknownKey {
                    key: "extra".into(),
                    provider: "yaml[b.yaml]".into(),
                    hint: None,
                },
                Violation::MissingRequired {
                    key: "db.password".into(),
                },
            ]
        );
    }

    #[test]
    fn test_lenient_mode_records_ignored_keys() {
        let mut registry = Registry::new();
        registry.str("name", "", "", []);

        let mut merger = Merger::new(&mut registry, false);
        merger.apply("json", partition(&[], &[("stray", "1")])).unwrap();
        let report = merger.finish().unwrap();

        assert_eq!(report.ignored["stray"], "json");
    }

    #[test]
    fn test_default_does_not_satisfy_required() {
        let mut registry = Registry::new();
        registry.str("token", "preset", "", [required()]);

        let err = Merger::new(&mut registry, false).finish().unwrap_err();
        assert_eq!(
            err.violations(),
            [Violation::MissingRequired { key: "token".into() }]
        );
    }
}
