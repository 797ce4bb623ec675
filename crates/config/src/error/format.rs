//! Enhanced error formatting with colors and context

use crate::error::{ConfigError, Violation};
use std::fmt;
use yansi::Paint;

/// Format resolution errors for a terminal
pub struct ErrorFormatter<'a> {
    error: &'a ConfigError,
    use_colors: bool,
}

impl<'a> ErrorFormatter<'a> {
    /// Create a new error formatter
    pub fn new(error: &'a ConfigError) -> Self {
        Self {
            error,
            use_colors: supports_color(),
        }
    }

    /// Format the error with colors and context
    pub fn format(&self) -> String {
        if self.use_colors {
            self.format_colored()
        } else {
            self.format_plain()
        }
    }

    fn format_colored(&self) -> String {
        match self.error {
            ConfigError::Provider { provider, source } => {
                format!(
                    "{} Source {} failed\n  {}",
                    Paint::red("✗").bold(),
                    Paint::cyan(provider),
                    source
                )
            }
            ConfigError::InvalidValue {
                key,
                provider,
                source,
            } => {
                let text = format!("{:?}", source.text);
                format!(
                    "{} Invalid {} value {} for {} (from {})\n  {}: {}",
                    Paint::red("✗").bold(),
                    source.kind,
                    Paint::yellow(&text),
                    Paint::cyan(key),
                    provider,
                    Paint::bold("Reason"),
                    source.reason
                )
            }
            ConfigError::Violations(violations) => {
                let mut out = format!(
                    "{} Configuration has {} violation(s):",
                    Paint::red("✗").bold(),
                    violations.len()
                );
                for v in violations.iter() {
                    out.push_str("\n  ");
                    out.push_str(&format_violation(v));
                }
                out
            }
        }
    }

    fn format_plain(&self) -> String {
        self.error.to_string()
    }
}

fn format_violation(v: &Violation) -> String {
    match v {
        Violation::MissingRequired { key } => {
            format!("{} required option {} was not supplied", Paint::red("-"), Paint::cyan(key))
        }
        Violation::UnknownKey {
            key,
            provider,
            hint,
        } => {
            let mut line = format!(
                "{} unknown key {} in {}",
                Paint::red("-"),
                Paint::yellow(key),
                provider
            );
            if let Some(hint) = hint {
                line.push_str(&format!(" {}", Paint::green(hint)));
            }
            line
        }
    }
}

/// Check if terminal supports colors
fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    atty::is(atty::Stream::Stderr)
}

impl fmt::Display for ErrorFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
