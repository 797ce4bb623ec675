mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{handle_describe, handle_resolve, Cli, Commands};
use tiercfg_config::{ConfigError, ErrorFormatter};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<ConfigError>() {
            Some(config_err) => eprintln!("{}", ErrorFormatter::new(config_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Resolve(args) => handle_resolve(&cli.schema, args),
        Commands::Describe => handle_describe(&cli.schema),
    }
}
