//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use taskpad_core::config::{Config, paths};
use taskpad_core::logging;

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(version = "1.0")]
#[command(about = "Terminal to-do client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // default to the interactive client
    let Some(command) = cli.command else {
        let _guard = logging::init().context("init logging")?;
        let config = Config::load().context("load config")?;

        // one tokio runtime for everything
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        return rt.block_on(async move { taskpad_tui::run_app(&config) });
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                println!("{}", paths::config_path().display());
                Ok(())
            }
        },
    }
}
