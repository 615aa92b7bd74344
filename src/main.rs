use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use voxport::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "voxport")]
#[command(about = "Voice command dispatch and voice analytics")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.voxport/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// List the voice command catalog
    Commands,

    /// Replay a script of recognition callbacks through the engine
    Simulate {
        /// Script file, one step per line
        script: PathBuf,

        /// User id recorded on the analytics session
        #[arg(long, default_value = "cli-user")]
        user: String,

        /// Record into the configured analytics store instead of memory
        #[arg(long)]
        persist: bool,
    },

    /// Show the analytics snapshot
    Report {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show optimization recommendations
    Recommendations,

    /// Export events and sessions to a JSON file
    Export { file: PathBuf },

    /// Replace stored analytics with an export file
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so report output stays pipeable
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config;
    let load = || Config::load_from(config_path.as_deref());

    match cli.command {
        Commands::Init { force } => cli::init::init_command(config_path.clone(), force)?,
        Commands::Commands => cli::commands::commands_command(&load()?)?,
        Commands::Simulate {
            script,
            user,
            persist,
        } => cli::simulate::simulate_command(&load()?, &script, &user, persist).await?,
        Commands::Report { json } => cli::report::report_command(&load()?, json)?,
        Commands::Recommendations => cli::report::recommendations_command(&load()?)?,
        Commands::Export { file } => cli::transfer::export_command(&load()?, &file)?,
        Commands::Import { file } => cli::transfer::import_command(&load()?, &file)?,
    }

    Ok(())
}
