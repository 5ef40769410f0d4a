//! Logtriage Control - CLI for the failure log triage engine
//!
//! Classifies CI failure logs against pattern rules and prints the
//! diagnosis as JSON.

mod commands;
mod config;
mod errors;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "triagectl")]
#[command(about = "Logtriage - CI failure log classification", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to ~/.config/logtriage/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a failure log and print the diagnosis as JSON
    Analyze {
        /// Log file to read (stdin when omitted)
        log_file: Option<PathBuf>,

        /// Local pattern rule file
        #[arg(long)]
        patterns: Option<PathBuf>,

        /// Remote pattern rule URL
        #[arg(long)]
        remote_url: Option<String>,

        /// Enable the AI fallback tier
        #[arg(long)]
        ai: bool,

        /// Name of the failed step, if already known
        #[arg(long)]
        step: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Work with pattern rule files
    Patterns {
        #[command(subcommand)]
        command: PatternsCommand,
    },
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// Validate a rule file offline
    Validate {
        /// Rule file to check
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays pipeable JSON
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            errors::EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze { log_file, patterns, remote_url, ai, step, pretty } => {
            commands::analyze(config_path, log_file, patterns, remote_url, ai, step, pretty)
                .await?;
            Ok(errors::EXIT_SUCCESS)
        }
        Commands::Patterns { command } => match command {
            PatternsCommand::Validate { file } => {
                let ok = commands::validate(&file)?;
                Ok(if ok { errors::EXIT_SUCCESS } else { errors::EXIT_VALIDATION_FAILED })
            }
        },
    }
}
