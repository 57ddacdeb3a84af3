use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wod_cli::commands::{book, cancel, classes, window};
use wod_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays clean on stdout
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Book(args)) => {
            let config = load_config(cli.config.as_deref())?;
            book::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Window(args)) => {
            let config = load_config(cli.config.as_deref())?;
            window::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Classes(args)) => {
            let config = load_config(cli.config.as_deref())?;
            classes::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Cancel(args)) => {
            let config = load_config(cli.config.as_deref())?;
            cancel::run(&mut stdout, args, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
