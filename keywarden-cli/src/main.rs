//! `Keywarden` CLI - Command-line interface for `Keywarden` password stores
//!
//! Provides commands for creating stores, listing and adding groups and
//! entries, and managing the saved store passwords used for automatic
//! unlock.

mod cli;
mod commands;
mod error;
mod prompt;
mod util;

use clap::Parser;
use cli::Cli;
use keywarden_core::tracing::{TracingConfig, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // A broken config file is reported by the command itself
    let logging = util::load_settings(config_path)
        .map(|settings| settings.logging)
        .unwrap_or_default();

    let level = if cli.quiet {
        TracingLevel::Error
    } else if cli.verbose > 0 {
        TracingLevel::from_verbosity(cli.verbose)
    } else {
        logging.tracing_level()
    };
    let mut tracing_config = TracingConfig::new().with_level(level);
    if let Some(filter) = logging.filter.filter(|_| cli.verbose == 0 && !cli.quiet) {
        tracing_config = tracing_config.with_filter(filter);
    }
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: {e}");
    }

    let result = commands::dispatch(config_path, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
