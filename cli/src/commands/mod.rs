pub mod describe;
pub mod resolve;
pub mod schema;

pub use describe::handle_describe;
pub use resolve::{handle_resolve, ResolveArgs};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tiercfg")]
#[command(about = "resolve declared options from layered configuration sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Option schema (YAML or JSON)
    #[arg(short, long, value_name = "FILE", global = true, default_value = "tiercfg.schema.yaml")]
    pub schema: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every option and print the effective values
    Resolve(ResolveArgs),
    /// List the declared options
    Describe,
}
