//! Document sources: local files and http(s) URLs

use super::formats::{self, Document};
use crate::error::ProviderError;
use crate::flatten::flatten;
use crate::provider::{AwaitedKeys, Partition, Provider, Stringify};
use reqwest::Url;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default bound on a remote fetch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Format for configuration documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl ConfigFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }

    fn decode(&self, content: &str, location: Option<&str>) -> Result<Document, ProviderError> {
        match self {
            Self::Yaml => formats::yaml::parse_with_path(content, location),
            Self::Toml => formats::toml::parse_with_path(content, location),
            Self::Json => formats::json::parse_with_path(content, location),
        }
    }
}

/// Detect the document format from a file extension
pub fn detect_format(path: &Path) -> Result<ConfigFormat, ProviderError> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yml") | Some("yaml") => Ok(ConfigFormat::Yaml),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("json") => Ok(ConfigFormat::Json),
        _ => Err(ProviderError::UnknownFormat {
            locator: path.display().to_string(),
        }),
    }
}

/// Where a document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Http(Url),
    File(PathBuf),
}

impl Locator {
    /// Parse `http://`, `https://` and `file://` URLs; text without a scheme is a local path
    pub fn parse(text: &str) -> Result<Self, ProviderError> {
        let invalid = |e: &dyn fmt::Display| ProviderError::InvalidLocator {
            locator: text.to_string(),
            message: e.to_string(),
        };

        match scheme_of(text) {
            None => Ok(Self::File(PathBuf::from(text))),
            // A drive letter, not a scheme.
            Some(scheme) if scheme.len() == 1 => Ok(Self::File(PathBuf::from(text))),
            Some(scheme) => match scheme.to_ascii_lowercase().as_str() {
                "http" | "https" => Url::parse(text).map(Self::Http).map_err(|e| invalid(&e)),
                "file" => {
                    let url = Url::parse(text).map_err(|e| invalid(&e))?;
                    Ok(Self::File(file_url_path(&url)))
                }
                _ => Err(ProviderError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    locator: text.to_string(),
                }),
            },
        }
    }

    /// Path used for format detection
    pub fn path(&self) -> &Path {
        match self {
            Self::Http(url) => Path::new(url.path()),
            Self::File(path) => path,
        }
    }

    fn fetch(&self, timeout: Duration) -> Result<String, ProviderError> {
        match self {
            Self::Http(url) => {
                let http = |source| ProviderError::Http {
                    url: url.to_string(),
                    source,
                };
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(http)?;
                let response = client.get(url.clone()).send().map_err(http)?;
                if response.status() != reqwest::StatusCode::OK {
                    return Err(ProviderError::Status {
                        url: url.to_string(),
                        status: response.status(),
                    });
                }
                response.text().map_err(http)
            }
            Self::File(path) => fs::read_to_string(path).map_err(|source| ProviderError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// RFC 3986 scheme prefix (`alpha *( alpha / digit / "+" / "-" / "." ) ":"`)
fn scheme_of(text: &str) -> Option<&str> {
    let (scheme, _) = text.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// `file://host/path` keeps the host as a leading path component.
fn file_url_path(url: &Url) -> PathBuf {
    url.to_file_path().unwrap_or_else(|()| {
        let host = url.host_str().unwrap_or_default();
        PathBuf::from(format!("{}{}", host, url.path()))
    })
}

/// Provider reading one JSON, YAML or TOML document
///
/// With no locator the provider is a no-op. Empty documents yield nothing.
#[derive(Debug, Clone)]
pub struct FileProvider {
    format: Option<ConfigFormat>,
    locator: Option<String>,
    optional: bool,
    timeout: Duration,
}

impl FileProvider {
    /// `format: None` detects the format from the locator's extension
    pub fn new(format: Option<ConfigFormat>, locator: Option<String>) -> Self {
        Self {
            format,
            locator,
            optional: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn json(locator: impl Into<String>) -> Self {
        Self::new(Some(ConfigFormat::Json), Some(locator.into()))
    }

    pub fn yaml(locator: impl Into<String>) -> Self {
        Self::new(Some(ConfigFormat::Yaml), Some(locator.into()))
    }

    pub fn toml(locator: impl Into<String>) -> Self {
        Self::new(Some(ConfigFormat::Toml), Some(locator.into()))
    }

    pub fn detect(locator: impl Into<String>) -> Self {
        Self::new(None, Some(locator.into()))
    }

    /// Read from a URL held by an option; an unset URL reads nothing
    pub fn from_url(format: ConfigFormat, url: Option<&Url>) -> Self {
        Self::new(Some(format), url.map(Url::to_string))
    }

    /// A missing local file reads as empty instead of failing
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn read(&self, locator: &Locator) -> Result<Option<String>, ProviderError> {
        match locator.fetch(self.timeout) {
            Ok(content) => Ok(Some(content)),
            Err(ProviderError::Io { source, .. })
                if self.optional && source.kind() == ErrorKind::NotFound =>
            {
                debug!(locator = %locator, "optional file is absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Provider for FileProvider {
    fn type_name(&self) -> String {
        let name = self.format.map(|f| f.name()).unwrap_or("file");
        match &self.locator {
            Some(locator) => format!("{}[{}]", name, locator),
            None => name.to_string(),
        }
    }

    fn provide(
        &self,
        awaited: &AwaitedKeys,
        stringify: Stringify,
    ) -> Result<Partition, ProviderError> {
        let Some(text) = &self.locator else {
            debug!(provider = %self.type_name(), "no source configured");
            return Ok(Partition::default());
        };

        let locator = Locator::parse(text)?;
        let format = match self.format {
            Some(format) => format,
            None => detect_format(locator.path())?,
        };

        let content = match self.read(&locator)? {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Ok(Partition::default()),
        };

        let root = format.decode(&content, Some(text))?;
        Ok(flatten(&root, awaited, stringify))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_yaml() {
        assert_eq!(
            detect_format(&PathBuf::from("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            detect_format(&PathBuf::from("config.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
    }

    #[test]
    fn test_detect_toml() {
        assert_eq!(
            detect_format(&PathBuf::from("config.toml")).unwrap(),
            ConfigFormat::Toml
        );
    }

    #[test]
    fn test_detect_json() {
        assert_eq!(
            detect_format(&PathBuf::from("config.json")).unwrap(),
            ConfigFormat::Json
        );
    }

    #[test]
    fn test_unknown_format() {
        assert!(detect_format(&PathBuf::from("config.txt")).is_err());
    }

    #[test]
    fn test_locator_schemes() {
        assert_eq!(
            Locator::parse("conf/app.json").unwrap(),
            Locator::File(PathBuf::from("conf/app.json"))
        );
        assert_eq!(
            Locator::parse("/etc/app.yaml").unwrap(),
            Locator::File(PathBuf::from("/etc/app.yaml"))
        );
        assert_eq!(
            Locator::parse("file:///etc/app.yaml").unwrap(),
            Locator::File(PathBuf::from("/etc/app.yaml"))
        );
        assert!(matches!(
            Locator::parse("https://example.com/app.json").unwrap(),
            Locator::Http(_)
        ));
        assert_eq!(
            Locator::parse(r"C:\conf\app.json").unwrap(),
            Locator::File(PathBuf::from(r"C:\conf\app.json"))
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = Locator::parse("ftp://example.com/file.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported URL scheme 'ftp' for ftp://example.com/file.json"
        );
    }

    #[test]
    fn test_http_locator_path_for_detection() {
        let locator = Locator::parse("http://example.com/conf/app.yaml?rev=2").unwrap();
        assert_eq!(detect_format(locator.path()).unwrap(), ConfigFormat::Yaml);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(FileProvider::json("cfg.json").type_name(), "json[cfg.json]");
        assert_eq!(FileProvider::new(Some(ConfigFormat::Yaml), None).type_name(), "yaml");
        assert_eq!(FileProvider::detect("a.toml").type_name(), "file[a.toml]");
    }

    #[test]
    fn test_unset_locator_reads_nothing() {
        let provider = FileProvider::from_url(ConfigFormat::Json, None);
        let awaited: AwaitedKeys = ["a"].into_iter().collect();
        let partition = provider.provide(&awaited, crate::provider::stringify).unwrap();
        assert!(partition.is_empty());
    }
}
