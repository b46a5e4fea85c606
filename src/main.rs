//! Crusher CLI - Audio Degradation Engine
//!
//! Command-line interface for the crusher engine.

use clap::Parser;
use env_logger::Env;
use log::info;

use crusher::cli::commands::{self, DemoOptions};
use crusher::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Crusher v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Crusher v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Presets => commands::list_presets()?,
        Commands::Demo {
            preset,
            params,
            frequency,
            duration,
            sample_rate,
            channels,
            chunk,
            seed,
        } => {
            let report = commands::demo(&DemoOptions {
                preset,
                params,
                frequency,
                duration,
                sample_rate,
                channels,
                chunk,
                seed,
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
