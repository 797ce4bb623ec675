//! Error types for option declaration, value parsing and resolution

pub mod format;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use format::ErrorFormatter;

/// Result type for resolution passes
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Text that is not a valid literal of an option kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value {text:?}: {reason}")]
pub struct ValueError {
    pub kind: &'static str,
    pub text: String,
    pub reason: String,
}

impl ValueError {
    pub fn new(kind: &'static str, text: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            kind,
            text: text.into(),
            reason: reason.to_string(),
        }
    }
}

/// Programmer errors detected while declaring options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("option name must not be empty")]
    EmptyName,

    #[error("invalid option name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("option '{name}' is already declared")]
    Duplicate { name: String },

    #[error("alias '{alias}' of '{name}' collides with an existing option or alias")]
    AliasConflict { name: String, alias: String },

    #[error("invalid default for option '{name}': {source}")]
    InvalidDefault {
        name: String,
        #[source]
        source: ValueError,
    },

    #[error("unknown option type '{tag}' for '{name}'")]
    UnknownType { name: String, tag: String },
}

/// Fatal failures of a single source
#[derive(Debug, Error)]
pub enum ProviderError {
    /// File could not be opened or read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level http failure, including timeouts
    #[error("http request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unsupported URL scheme '{scheme}' for {locator}")]
    UnsupportedScheme { scheme: String, locator: String },

    #[error("invalid source locator '{locator}': {message}")]
    InvalidLocator { locator: String, message: String },

    /// Extension does not name a known document format
    #[error(
        "Unknown configuration format for {locator}\n\
         Supported formats: .yml, .yaml, .toml, .json"
    )]
    UnknownFormat { locator: String },

    /// Undecodable document with an excerpt around the failing line
    #[error("Failed to parse {format} document{location}:\n{message}\n{context}")]
    Malformed {
        format: &'static str,
        location: String,
        message: String,
        context: String,
    },

    #[error("{format} root is not an object")]
    RootNotMapping { format: &'static str },

    #[error("failed to read dotenv file {path}: {message}")]
    Dotenv { path: PathBuf, message: String },
}

impl ProviderError {
    /// Create a malformed-document error from serde_json::Error
    pub fn from_json_error(err: serde_json::Error, content: &str, location: Option<&str>) -> Self {
        let context = excerpt(content, err.line(), err.column());
        Self::Malformed {
            format: "json",
            location: location.map(|l| format!(" in {}", l)).unwrap_or_default(),
            message: err.to_string(),
            context,
        }
    }

    /// Create a malformed-document error from serde_yaml::Error
    pub fn from_yaml_error(err: serde_yaml::Error, content: &str, location: Option<&str>) -> Self {
        let context = err
            .location()
            .map(|loc| excerpt(content, loc.line(), loc.column()))
            .unwrap_or_default();
        Self::Malformed {
            format: "yaml",
            location: location.map(|l| format!(" in {}", l)).unwrap_or_default(),
            message: err.to_string(),
            context,
        }
    }

    /// Create a malformed-document error from toml::de::Error
    pub fn from_toml_error(err: toml::de::Error, content: &str, location: Option<&str>) -> Self {
        let context = match err.span() {
            Some(span) => {
                let line = content[..span.start].matches('\n').count() + 1;
                excerpt(content, line, 0)
            }
            None => String::new(),
        };
        Self::Malformed {
            format: "toml",
            location: location.map(|l| format!(" in {}", l)).unwrap_or_default(),
            message: err.message().to_string(),
            context,
        }
    }

    pub(crate) fn malformed(format: &'static str, location: Option<&str>, message: String) -> Self {
        Self::Malformed {
            format,
            location: location.map(|l| format!(" in {}", l)).unwrap_or_default(),
            message,
            context: String::new(),
        }
    }
}

/// Errors returned by a resolution pass
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source was unreachable or malformed; the pass stopped there
    #[error("provider {provider}: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// A supplied text did not parse as the option's kind; the pass stopped there
    #[error("option '{key}' from {provider}: {source}")]
    InvalidValue {
        key: String,
        provider: String,
        #[source]
        source: ValueError,
    },

    /// Every missing required option and unknown key found in the pass
    #[error("{0}")]
    Violations(Violations),
}

impl ConfigError {
    /// Violations of a composite failure, empty for short-circuit errors
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Violations(v) => &v.0,
            _ => &[],
        }
    }
}

/// One independent finding of a resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("missing required option '{key}'")]
    MissingRequired { key: String },

    #[error(
        "unknown key '{key}' in {provider}{}",
        .hint.as_ref().map(|h| format!(" ({})", h)).unwrap_or_default()
    )]
    UnknownKey {
        key: String,
        provider: String,
        hint: Option<String>,
    },
}

impl Violation {
    pub fn key(&self) -> &str {
        match self {
            Self::MissingRequired { key } | Self::UnknownKey { key, .. } => key,
        }
    }
}

/// Composite list of violations, reported together
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration has {} violation(s):", self.0.len())?;
        for v in &self.0 {
            write!(f, "\n  - {}", v)?;
        }
        Ok(())
    }
}

/// Suggest the closest candidate key (Levenshtein-like), if any is close enough
pub(crate) fn suggest_key<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let input_lower = input.to_lowercase();
    candidates
        .into_iter()
        .map(|c| (distance(&input_lower, &c.to_lowercase()), c))
        .min()
        .filter(|(d, _)| *d <= 3)
        .map(|(_, c)| format!("did you mean '{}'?", c))
}

/// Simple character distance calculation
fn distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut curr_row = vec![i + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == *b_char { 0 } else { 1 };
            let best = (curr_row[j] + 1) // insertion
                .min(prev_row[j + 1] + 1) // deletion
                .min(prev_row[j] + cost); // substitution
            curr_row.push(best);
        }
        prev_row = curr_row;
    }

    *prev_row.last().unwrap_or(&0)
}

/// Lines around `line_num` (1-based) with a caret under `col_num` when known
fn excerpt(content: &str, line_num: usize, col_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();

    if line_num == 0 || line_num > lines.len() {
        return String::new();
    }

    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            if num == line_num {
                let mut result = format!("→ {:3} | {}", num, line);
                if col_num > 0 {
                    result.push_str(&format!("\n        {}^", " ".repeat(col_num - 1)));
                }
                result
            } else {
                format!("  {:3} | {}", num, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
