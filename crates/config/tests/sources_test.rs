use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tiercfg_config::provider::{stringify, AwaitedKeys, Provider};
use tiercfg_config::{ConfigError, EnvProvider, FileProvider, Loader, ProviderError, Registry};

fn awaited(keys: &[&str]) -> AwaitedKeys {
    keys.iter().copied().collect()
}

/// Serve exactly one http response on a local port
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{}/config.json", addr)
}

#[test]
fn test_empty_and_blank_files_yield_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    for (name, content) in [("a.json", ""), ("b.yaml", "  \n"), ("c.toml", "\n\n")] {
        let path = dir.path().join(name);
        fs::write(&path, content)?;
        let partition = FileProvider::detect(path.display().to_string())
            .provide(&awaited(&["x"]), stringify)?;
        assert!(partition.is_empty(), "{} should be empty", name);
    }
    Ok(())
}

#[test]
fn test_missing_file_is_fatal_unless_optional() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missing.yaml").display().to_string();

    let mut registry = Registry::new();
    registry.str("name", "", "", []);
    let err = Loader::new()
        .with_provider(FileProvider::yaml(path.as_str()))
        .parse(&mut registry)
        .unwrap_err();
    match err {
        ConfigError::Provider { provider, source } => {
            assert_eq!(provider, format!("yaml[{}]", path));
            assert!(matches!(source, ProviderError::Io { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }

    let report = Loader::new()
        .with_provider(FileProvider::yaml(path.as_str()).optional())
        .parse(&mut registry)?;
    assert!(report.origins.is_empty());
    Ok(())
}

#[test]
fn test_root_must_be_a_mapping() -> Result<()> {
    let dir = TempDir::new()?;
    let cases = [
        ("list.json", "[1, 2]"),
        ("scalar.yaml", "just text\n"),
    ];
    for (name, content) in cases {
        let path = dir.path().join(name);
        fs::write(&path, content)?;
        let err = FileProvider::detect(path.display().to_string())
            .provide(&awaited(&["x"]), stringify)
            .unwrap_err();
        assert!(matches!(err, ProviderError::RootNotMapping { .. }), "{}: {}", name, err);
    }
    Ok(())
}

#[test]
fn test_malformed_document_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"a\": }")?;
    let err = FileProvider::json(path.display().to_string())
        .provide(&awaited(&["a"]), stringify)
        .unwrap_err();
    assert!(matches!(err, ProviderError::Malformed { format: "json", .. }));
    Ok(())
}

#[test]
fn test_formats_flatten_alike() -> Result<()> {
    let dir = TempDir::new()?;
    let docs = [
        ("app.json", r#"{"server": {"port": 8080, "hosts": ["a", "b"]}, "debug": true}"#),
        ("app.yaml", "server:\n  port: 8080\n  hosts: [a, b]\ndebug: true\n"),
        ("app.toml", "debug = true\n\n[server]\nport = 8080\nhosts = [\"a\", \"b\"]\n"),
    ];

    for (name, content) in docs {
        let path = dir.path().join(name);
        fs::write(&path, content)?;

        let mut registry = Registry::new();
        let port = registry.uint32("server.port", 0, "", []);
        let hosts = registry.strs("server.hosts", &[], "", []);
        let debug = registry.bool("debug", false, "", []);
        Loader::new()
            .with_file(path.display().to_string())
            .parse(&mut registry)?;

        assert_eq!(port.get(), 8080, "{}", name);
        assert_eq!(hosts.get(), ["a", "b"], "{}", name);
        assert!(debug.get(), "{}", name);
    }
    Ok(())
}

#[test]
fn test_file_url_locator() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"name": "from-file-url"}"#)?;

    let mut registry = Registry::new();
    let name = registry.str("name", "", "", []);
    Loader::new()
        .with_file(format!("file://{}", path.display()))
        .parse(&mut registry)?;
    assert_eq!(name.get(), "from-file-url");
    Ok(())
}

#[test]
fn test_unsupported_scheme_is_fatal() {
    let err = FileProvider::json("ftp://example.com/app.json")
        .provide(&awaited(&["x"]), stringify)
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
}

#[test]
fn test_http_source() -> Result<()> {
    let url = serve_once("200 OK", r#"{"service": {"name": "remote"}}"#);

    let mut registry = Registry::new();
    let name = registry.str("service.name", "", "", []);
    let report = Loader::new()
        .with_provider(FileProvider::json(url.as_str()).timeout(Duration::from_secs(5)))
        .parse(&mut registry)?;

    assert_eq!(name.get(), "remote");
    assert_eq!(report.origins["service.name"], format!("json[{}]", url));
    Ok(())
}

#[test]
fn test_http_error_status_is_fatal() {
    let url = serve_once("404 Not Found", "");
    let err = FileProvider::json(url.as_str())
        .provide(&awaited(&["x"]), stringify)
        .unwrap_err();
    match err {
        ProviderError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_url_option_feeds_a_document_source() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("remote.yaml");
    fs::write(&path, "level: debug\n")?;

    let mut bootstrap = Registry::new();
    let source = bootstrap.url("config.url", "", "", []);
    tiercfg_config::parse(
        &mut bootstrap,
        &[&tiercfg_config::ArgsProvider::new([format!("--config.url=file://{}", path.display())])],
    )?;

    let mut registry = Registry::new();
    let level = registry.str("level", "info", "", []);
    let url = source.get();
    Loader::new()
        .with_provider(FileProvider::from_url(
            tiercfg_config::ConfigFormat::Yaml,
            url.as_ref(),
        ))
        .parse(&mut registry)?;
    assert_eq!(level.get(), "debug");
    Ok(())
}

#[test]
fn test_env_overrides_files() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.toml");
    fs::write(&path, "[db]\nhost = \"file-host\"\nport = 5432\n")?;

    // Only test in this binary that touches the environment.
    std::env::set_var("TIERCFG_IT_DB_HOST", "env-host");

    let mut registry = Registry::new();
    let host = registry.str("db.host", "", "", []);
    let port = registry.uint32("db.port", 0, "", []);
    let report = Loader::new()
        .with_file(path.display().to_string())
        .with_provider(EnvProvider::new().with_prefix("TIERCFG_IT"))
        .parse(&mut registry)?;
    std::env::remove_var("TIERCFG_IT_DB_HOST");

    assert_eq!(host.get(), "env-host");
    assert_eq!(port.get(), 5432);
    assert_eq!(report.origins["db.host"], "env");
    Ok(())
}
