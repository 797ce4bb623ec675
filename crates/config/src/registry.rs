//! Table of declared options
//!
//! A [`Registry`] is built once at startup: every option is declared with a name, a typed
//! default and a description, and the caller keeps the returned [`Handle`]. A resolution
//! pass (see [`crate::loader`]) then writes each option at most once per provider, and the
//! handles are read afterwards.
//!
//! Declaration mistakes are programmer bugs. The `declare*` helpers panic on them; the
//! `try_declare*` variants return the [`DeclarationError`] instead.

use crate::error::{DeclarationError, ValueError};
use crate::provider::AwaitedKeys;
use crate::value::{bind, Handle, Kind, Map, Value};
use reqwest::Url;
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::time::Duration;
use tracing::trace;

/// Text shown instead of a secret option's value
pub const REDACTED: &str = "<redacted>";

/// Declaration-time flags of an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionMeta {
    /// Resolution fails unless some provider supplies the option
    Required,
    /// Value never appears in dumps or logs
    Secret,
    /// Additional key accepted as a source for the option
    Alias(String),
}

pub fn required() -> OptionMeta {
    OptionMeta::Required
}

pub fn secret() -> OptionMeta {
    OptionMeta::Secret
}

pub fn alias(name: impl Into<String>) -> OptionMeta {
    OptionMeta::Alias(name.into())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub required: bool,
    pub secret: bool,
    pub aliases: Vec<String>,
}

impl Meta {
    fn collect(
        name: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Result<Self, DeclarationError> {
        let mut meta = Meta::default();
        for flag in flags {
            match flag {
                OptionMeta::Required => meta.required = true,
                OptionMeta::Secret => meta.secret = true,
                OptionMeta::Alias(alias) => {
                    if alias == name || meta.aliases.contains(&alias) {
                        return Err(DeclarationError::AliasConflict {
                            name: name.to_string(),
                            alias,
                        });
                    }
                    validate_name(&alias)?;
                    meta.aliases.push(alias);
                }
            }
        }
        Ok(meta)
    }
}

/// One declared option
pub struct OptionEntry {
    name: String,
    description: String,
    default_text: String,
    meta: Meta,
    value: Box<dyn Value>,
    origin: Option<String>,
}

impl OptionEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn is_required(&self) -> bool {
        self.meta.required
    }

    pub fn is_secret(&self) -> bool {
        self.meta.secret
    }

    /// Provider that last set the option, `None` while it holds its default
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Canonical text of the current value, secrets included
    pub fn value_text(&self) -> String {
        self.value.to_text()
    }

    /// Canonical text of the current value with secrets redacted
    pub fn display_text(&self) -> String {
        if self.meta.secret {
            REDACTED.to_string()
        } else {
            self.value.to_text()
        }
    }

    /// Canonical text of the default with secrets redacted
    pub fn default_text(&self) -> &str {
        if self.meta.secret {
            REDACTED
        } else {
            &self.default_text
        }
    }

    pub(crate) fn set(&mut self, text: &str, origin: &str) -> Result<(), ValueError> {
        self.value.set(text)?;
        self.origin = Some(origin.to_string());
        Ok(())
    }
}

/// Declared options, looked up by name or alias
#[derive(Default)]
pub struct Registry {
    options: Vec<OptionEntry>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option whose cell is built by `make`
    ///
    /// `make` receives the default and the storage it must initialise; [`bind`] is the
    /// constructor for every built-in kind.
    pub fn try_declare_with<T, F>(
        &mut self,
        name: &str,
        default: T,
        description: &str,
        make: F,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Result<Handle<T>, DeclarationError>
    where
        T: Clone,
        F: FnOnce(T, Handle<T>) -> Box<dyn Value>,
    {
        validate_name(name)?;
        if self.index.contains_key(name) {
            return Err(DeclarationError::Duplicate {
                name: name.to_string(),
            });
        }
        let meta = Meta::collect(name, flags)?;
        if let Some(alias) = meta.aliases.iter().find(|a| self.index.contains_key(*a)) {
            return Err(DeclarationError::AliasConflict {
                name: name.to_string(),
                alias: alias.clone(),
            });
        }

        let handle = Handle::new(default.clone());
        let value = make(default, handle.clone());
        trace!(option = name, kind = value.type_name(), "declared option");

        let position = self.options.len();
        self.index.insert(name.to_string(), position);
        for alias in &meta.aliases {
            self.index.insert(alias.clone(), position);
        }
        self.options.push(OptionEntry {
            name: name.to_string(),
            description: description.to_string(),
            default_text: value.to_text(),
            meta,
            value,
            origin: None,
        });

        Ok(handle)
    }

    /// Declare an option whose cell is built by `make`
    ///
    /// # Panics
    ///
    /// On any [`DeclarationError`].
    pub fn declare_with<T, F>(
        &mut self,
        name: &str,
        default: T,
        description: &str,
        make: F,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<T>
    where
        T: Clone,
        F: FnOnce(T, Handle<T>) -> Box<dyn Value>,
    {
        match self.try_declare_with(name, default, description, make, flags) {
            Ok(handle) => handle,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_declare<T: Kind>(
        &mut self,
        name: &str,
        default: T,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Result<Handle<T>, DeclarationError> {
        self.try_declare_with(name, default, description, bind::<T>, flags)
    }

    /// Declare an option of any built-in kind
    ///
    /// # Panics
    ///
    /// On an empty or malformed name, or a name/alias that is already taken.
    pub fn declare<T: Kind>(
        &mut self,
        name: &str,
        default: T,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<T> {
        self.declare_with(name, default, description, bind::<T>, flags)
    }

    /// Declare an option by type tag with a textual default
    ///
    /// A missing default means the kind's zero value. Used for schemas loaded at runtime.
    pub fn declare_tagged(
        &mut self,
        tag: &str,
        name: &str,
        default_text: Option<&str>,
        description: &str,
        flags: Vec<OptionMeta>,
    ) -> Result<(), DeclarationError> {
        macro_rules! try_kinds {
            ($($ty:ty),* $(,)?) => {
                $(
                    if tag == <$ty as Kind>::TYPE {
                        return self.declare_text::<$ty>(name, default_text, description, flags);
                    }
                )*
            };
        }

        try_kinds!(
            bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String,
            Duration, IpAddr, Option<Url>, Map,
            Vec<bool>, Vec<i8>, Vec<i16>, Vec<i32>, Vec<i64>, Vec<isize>,
            Vec<u8>, Vec<u16>, Vec<u32>, Vec<u64>, Vec<usize>, Vec<f32>, Vec<f64>,
            Vec<String>, Vec<Duration>, Vec<IpAddr>,
        );

        Err(DeclarationError::UnknownType {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    fn declare_text<T: Kind>(
        &mut self,
        name: &str,
        default_text: Option<&str>,
        description: &str,
        flags: Vec<OptionMeta>,
    ) -> Result<(), DeclarationError> {
        let default = match default_text {
            Some(text) => parse_default::<T>(name, text)?,
            None => T::zero(),
        };
        self.try_declare(name, default, description, flags).map(drop)
    }

    pub fn bool(
        &mut self,
        name: &str,
        default: bool,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<bool> {
        self.declare(name, default, description, flags)
    }

    pub fn bools(
        &mut self,
        name: &str,
        default: Vec<bool>,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<bool>> {
        self.declare(name, default, description, flags)
    }

    pub fn int(
        &mut self,
        name: &str,
        default: isize,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<isize> {
        self.declare(name, default, description, flags)
    }

    pub fn ints(
        &mut self,
        name: &str,
        default: Vec<isize>,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<isize>> {
        self.declare(name, default, description, flags)
    }

    pub fn int32(
        &mut self,
        name: &str,
        default: i32,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<i32> {
        self.declare(name, default, description, flags)
    }

    pub fn int64(
        &mut self,
        name: &str,
        default: i64,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<i64> {
        self.declare(name, default, description, flags)
    }

    pub fn uint(
        &mut self,
        name: &str,
        default: usize,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<usize> {
        self.declare(name, default, description, flags)
    }

    pub fn uint32(
        &mut self,
        name: &str,
        default: u32,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<u32> {
        self.declare(name, default, description, flags)
    }

    pub fn uint64(
        &mut self,
        name: &str,
        default: u64,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<u64> {
        self.declare(name, default, description, flags)
    }

    pub fn float32(
        &mut self,
        name: &str,
        default: f32,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<f32> {
        self.declare(name, default, description, flags)
    }

    pub fn float64(
        &mut self,
        name: &str,
        default: f64,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<f64> {
        self.declare(name, default, description, flags)
    }

    pub fn floats64(
        &mut self,
        name: &str,
        default: Vec<f64>,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<f64>> {
        self.declare(name, default, description, flags)
    }

    pub fn str(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<String> {
        self.declare(name, default.to_string(), description, flags)
    }

    pub fn strs(
        &mut self,
        name: &str,
        default: &[&str],
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<String>> {
        let default = default.iter().map(|s| s.to_string()).collect();
        self.declare(name, default, description, flags)
    }

    pub fn duration(
        &mut self,
        name: &str,
        default: Duration,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Duration> {
        self.declare(name, default, description, flags)
    }

    pub fn durations(
        &mut self,
        name: &str,
        default: Vec<Duration>,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<Duration>> {
        self.declare(name, default, description, flags)
    }

    pub fn map(
        &mut self,
        name: &str,
        default: Map,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Map> {
        self.declare(name, default, description, flags)
    }

    /// # Panics
    ///
    /// When `default` is not an IP literal.
    pub fn ip(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<IpAddr> {
        let default = unwrap_declaration(parse_default::<IpAddr>(name, default));
        self.declare(name, default, description, flags)
    }

    /// # Panics
    ///
    /// When any default entry is not an IP literal.
    pub fn ips(
        &mut self,
        name: &str,
        default: &[&str],
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Vec<IpAddr>> {
        let default = default
            .iter()
            .map(|text| unwrap_declaration(parse_default::<IpAddr>(name, text)))
            .collect();
        self.declare(name, default, description, flags)
    }

    /// An empty `default` leaves the URL unset.
    ///
    /// # Panics
    ///
    /// When `default` is neither empty nor an absolute URL.
    pub fn url(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
        flags: impl IntoIterator<Item = OptionMeta>,
    ) -> Handle<Option<Url>> {
        let default = unwrap_declaration(parse_default::<Option<Url>>(name, default));
        self.declare(name, default, description, flags)
    }

    /// Every option name and alias
    pub fn awaited_keys(&self) -> AwaitedKeys {
        self.index.keys().cloned().collect()
    }

    /// Look up an option by name or alias
    pub fn entry(&self, key: &str) -> Option<&OptionEntry> {
        self.index.get(key).map(|&i| &self.options[i])
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut OptionEntry> {
        let i = *self.index.get(key)?;
        self.options.get_mut(i)
    }

    /// Options in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &OptionEntry> {
        self.options.iter()
    }

    /// Effective values by name, secrets redacted
    pub fn dump(&self) -> BTreeMap<String, String> {
        self.options
            .iter()
            .map(|o| (o.name.clone(), o.display_text()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), DeclarationError> {
    if name.is_empty() {
        return Err(DeclarationError::EmptyName);
    }
    let reason = if name.split('.').any(str::is_empty) {
        Some("empty path segment")
    } else if name.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DeclarationError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn parse_default<T: Kind>(name: &str, text: &str) -> Result<T, DeclarationError> {
    T::parse(text).map_err(|source| DeclarationError::InvalidDefault {
        name: name.to_string(),
        source,
    })
}

fn unwrap_declaration<T>(result: Result<T, DeclarationError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}
