//! CLI subcommands
//!
//! Drive commands share a [`Session`]: the loaded configuration plus a
//! provider built from it and the bearer token.

pub mod config;
pub mod items;
pub mod transfer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::debug;

use odbridge_conflict::SiblingConflictResolver;
use odbridge_core::config::Config;
use odbridge_core::domain::{Metadata, MetadataResult};
use odbridge_graph::{OneDriveProvider, ProviderSettings};

use crate::output::{OutputFormat, OutputFormatter};

use self::items::{MkdirCommand, RevisionsCommand, RmCommand, StatCommand, ValidateCommand};
use self::transfer::{CopyCommand, GetCommand, MoveCommand, PutCommand};

/// Commands that talk to the drive
#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// Resolve a path and show its identifiers
    Validate(ValidateCommand),
    /// Show a file's metadata or a folder's listing
    Stat(StatCommand),
    /// Download a file
    Get(GetCommand),
    /// Upload a local file
    Put(PutCommand),
    /// Delete an item
    Rm(RmCommand),
    /// Create a folder (the path must end with '/')
    Mkdir(MkdirCommand),
    /// Copy an item within the drive
    Cp(CopyCommand),
    /// Move or rename an item within the drive
    Mv(MoveCommand),
    /// List the revisions the delta feed still knows about
    Revisions(RevisionsCommand),
}

impl DriveCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        match self {
            Self::Validate(cmd) => cmd.execute(session, format).await,
            Self::Stat(cmd) => cmd.execute(session, format).await,
            Self::Get(cmd) => cmd.execute(session, format).await,
            Self::Put(cmd) => cmd.execute(session, format).await,
            Self::Rm(cmd) => cmd.execute(session, format).await,
            Self::Mkdir(cmd) => cmd.execute(session, format).await,
            Self::Cp(cmd) => cmd.execute(session, format).await,
            Self::Mv(cmd) => cmd.execute(session, format).await,
            Self::Revisions(cmd) => cmd.execute(session, format).await,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Everything a drive command needs
pub struct Session {
    pub config: Config,
    pub provider: OneDriveProvider,
}

impl Session {
    /// Builds the provider from validated configuration
    ///
    /// # Errors
    /// Fails on invalid configuration or when no token is available
    pub fn connect(config: Config, token_flag: Option<&str>) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration: {}", messages.join("; "));
        }

        let token = resolve_token(token_flag, &config.auth.token_env)?;
        let settings = ProviderSettings::from_config(&config.provider, token)
            .context("Failed to derive provider settings")?;
        debug!(?settings, "Provider settings");

        let provider = OneDriveProvider::new(settings, Arc::new(SiblingConflictResolver::new()));
        Ok(Self { config, provider })
    }
}

/// Loads the configuration file
///
/// An explicitly named file must exist; the default location falls back to
/// built-in defaults.
pub fn load_config(path: &Path, explicit: bool) -> Result<Config> {
    if explicit {
        return Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }
    Ok(Config::load_or_default(path))
}

/// Picks the bearer token: the flag wins over the environment
pub fn resolve_token(flag: Option<&str>, env_name: &str) -> Result<String> {
    if let Some(token) = flag.filter(|t| !t.trim().is_empty()) {
        return Ok(token.to_string());
    }
    match std::env::var(env_name) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => bail!("No access token: pass --token or set {env_name}"),
    }
}

// ============================================================================
// Shared output helpers
// ============================================================================

/// One line per entry: kind marker, path, and size for files
fn describe(entry: &Metadata) -> String {
    match entry {
        Metadata::File(f) => format!("{}  ({} bytes, id {})", f.path, f.size, f.id),
        Metadata::Folder(f) => format!("{}  (folder, id {})", f.path, f.id),
    }
}

pub(crate) fn print_metadata(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    result: &MetadataResult,
) -> Result<()> {
    if format.is_json() {
        let json = serde_json::to_value(result).context("Failed to serialize metadata")?;
        formatter.print_json(&json);
        return Ok(());
    }

    match result {
        MetadataResult::File(file) => {
            formatter.success(&file.path);
            formatter.info(&format!("id:       {}", file.id));
            formatter.info(&format!("size:     {} bytes", file.size));
            if let Some(etag) = &file.etag {
                formatter.info(&format!("etag:     {etag}"));
            }
            if let Some(modified) = file.modified {
                formatter.info(&format!("modified: {}", modified.to_rfc3339()));
            }
            if let Some(content_type) = &file.content_type {
                formatter.info(&format!("type:     {content_type}"));
            }
        }
        MetadataResult::Listing(entries) => {
            formatter.success(&format!("{} entries", entries.len()));
            for entry in entries {
                formatter.info(&describe(entry));
            }
        }
    }
    Ok(())
}
