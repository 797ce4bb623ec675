use super::schema::Schema;
use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tiercfg_config::{ArgsProvider, EnvProvider, FileProvider, Loader, Registry, Report};
use tracing::info;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// JSON document (path or http/https/file URL)
    #[arg(long = "json", value_name = "LOCATOR")]
    pub json: Vec<String>,

    /// YAML document (path or http/https/file URL)
    #[arg(long = "yaml", value_name = "LOCATOR")]
    pub yaml: Vec<String>,

    /// TOML document (path or http/https/file URL)
    #[arg(long = "toml", value_name = "LOCATOR")]
    pub toml: Vec<String>,

    /// Prefix for environment variable names
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Dotenv file consulted when a variable is not set
    #[arg(long, value_name = "FILE")]
    pub dotenv: Option<PathBuf>,

    /// Report unknown keys as warnings instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Option flags (`--key=value`) after `--`
    #[arg(last = true, value_name = "FLAGS")]
    pub flags: Vec<String>,
}

impl ResolveArgs {
    /// Documents in command-line group order, then env, then flags
    pub fn loader(&self) -> Loader {
        let mut loader = Loader::new().strict(!self.lenient);
        for locator in &self.json {
            loader = loader.with_provider(FileProvider::json(locator.as_str()));
        }
        for locator in &self.yaml {
            loader = loader.with_provider(FileProvider::yaml(locator.as_str()));
        }
        for locator in &self.toml {
            loader = loader.with_provider(FileProvider::toml(locator.as_str()));
        }

        let mut env = EnvProvider::new();
        if let Some(prefix) = &self.env_prefix {
            env = env.with_prefix(prefix.as_str());
        }
        if let Some(dotenv) = &self.dotenv {
            env = env.with_dotenv(dotenv);
        }

        loader
            .with_provider(env)
            .with_provider(ArgsProvider::new(self.flags.iter().cloned()))
    }
}

#[derive(Serialize)]
struct Output<'a> {
    values: BTreeMap<String, String>,
    #[serde(flatten)]
    report: &'a Report,
}

pub fn handle_resolve(schema: &Path, args: ResolveArgs) -> Result<()> {
    let mut registry = Schema::load(schema)?.registry()?;
    let report = args.loader().parse(&mut registry)?;
    info!(
        options = registry.len(),
        supplied = report.origins.len(),
        "configuration resolved"
    );

    let rendered = match args.format {
        OutputFormat::Text => render_text(&registry, &report),
        OutputFormat::Json => render_json(&registry, &report)?,
    };
    println!("{}", rendered);
    Ok(())
}

fn render_text(registry: &Registry, report: &Report) -> String {
    let width = registry.entries().map(|e| e.name().len()).max().unwrap_or(0);
    let mut lines: Vec<String> = registry
        .entries()
        .map(|entry| {
            let origin = entry.origin().unwrap_or("default");
            format!(
                "{:width$} = {}  ({})",
                entry.name(),
                entry.display_text(),
                origin,
                width = width
            )
        })
        .collect();
    for (key, provider) in &report.ignored {
        lines.push(format!("ignored {} from {}", key, provider));
    }
    lines.join("\n")
}

fn render_json(registry: &Registry, report: &Report) -> Result<String> {
    let output = Output {
        values: registry.dump(),
        report,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
