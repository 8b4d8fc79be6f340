//! odbridge CLI - Command-line access to a OneDrive drive through the
//! storage provider contract
//!
//! Provides commands for:
//! - Resolving paths and reading metadata
//! - Downloading (by revision and byte range) and uploading content
//! - Deleting, creating folders, copying and moving items
//! - Listing revisions
//! - Viewing and validating configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, DriveCommand, Session};
use odbridge_core::config::Config;
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "odbridge", version, about = "OneDrive storage provider bridge")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token; overrides the variable named by `auth.token_env`
    #[arg(long, global = true)]
    token: Option<String>,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Drive(DriveCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    if let Err(e) = run(cli, format).await {
        get_formatter(format).error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, format: OutputFormat) -> anyhow::Result<()> {
    let explicit = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        // Config commands report load failures themselves and need no token
        Commands::Config(cmd) => {
            init_tracing(cli.verbose, "info", cli.log_json);
            cmd.execute(&config_path, explicit, format).await
        }
        Commands::Drive(cmd) => {
            let config = commands::load_config(&config_path, explicit)?;
            init_tracing(
                cli.verbose,
                &config.logging.level,
                cli.log_json || config.logging.json,
            );

            let session = Session::connect(config, cli.token.as_deref())?;
            cmd.execute(&session, format).await
        }
    }
}

/// Logs go to stderr so downloads written to stdout stay clean
fn init_tracing(verbose: u8, level: &str, json: bool) {
    let filter = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
