use super::schema::Schema;
use anyhow::Result;
use std::path::Path;
use tiercfg_config::{OptionEntry, Registry};

pub fn handle_describe(schema: &Path) -> Result<()> {
    let registry = Schema::load(schema)?.registry()?;
    println!("{}", describe(&registry));
    Ok(())
}

fn describe(registry: &Registry) -> String {
    registry
        .entries()
        .map(describe_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_entry(entry: &OptionEntry) -> String {
    let mut line = format!(
        "{} ({}) default {}",
        entry.name(),
        entry.type_name(),
        entry.default_text()
    );
    let meta = entry.meta();
    if meta.required {
        line.push_str(" [required]");
    }
    if meta.secret {
        line.push_str(" [secret]");
    }
    if !meta.aliases.is_empty() {
        line.push_str(&format!(" [aliases: {}]", meta.aliases.join(", ")));
    }
    if !entry.description().is_empty() {
        line.push_str(&format!("\n    {}", entry.description()));
    }
    line
}
