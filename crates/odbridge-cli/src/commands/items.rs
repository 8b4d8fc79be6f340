//! Item commands: validate, stat, rm, mkdir, revisions

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use odbridge_core::ports::StorageProvider;

use super::{print_metadata, Session};
use crate::output::{get_formatter, OutputFormat};

/// Resolve a path and show its identifier chain
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Path to resolve, e.g. `/Documents/report.docx` or `/ITEMID`
    pub path: String,
}

impl ValidateCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = session.provider.validate_path(&self.path).await?;

        let ids: Vec<Option<String>> = path
            .ids()
            .iter()
            .map(|id| id.as_ref().map(ToString::to_string))
            .collect();
        let resolved = path.identifier().is_some();

        if format.is_json() {
            formatter.print_json(&json!({
                "path": path.materialized(),
                "names": path.names(),
                "ids": ids,
                "folder": path.is_folder(),
                "resolved": resolved,
            }));
            return Ok(());
        }

        formatter.success(&path.materialized());
        for (name, id) in path.names().iter().zip(&ids) {
            let name = if name.is_empty() { "(root)" } else { name.as_str() };
            formatter.info(&format!("{name:<24} {}", id.as_deref().unwrap_or("-")));
        }
        if !resolved {
            formatter.info("Not found; valid as a creation target");
        }
        Ok(())
    }
}

/// Show metadata or a listing
#[derive(Debug, Args)]
pub struct StatCommand {
    pub path: String,
}

impl StatCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = session.provider.validate_path(&self.path).await?;
        let result = session
            .provider
            .metadata(&path)
            .await
            .with_context(|| format!("Failed to read metadata of {path}"))?;
        print_metadata(formatter.as_ref(), format, &result)
    }
}

/// Delete an item
#[derive(Debug, Args)]
pub struct RmCommand {
    pub path: String,
}

impl RmCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = session.provider.validate_path(&self.path).await?;
        session
            .provider
            .delete(&path)
            .await
            .with_context(|| format!("Failed to delete {path}"))?;

        info!(path = %path, "Deleted");
        if format.is_json() {
            formatter.print_json(&json!({ "success": true, "deleted": path.materialized() }));
        } else {
            formatter.success(&format!("Deleted {path}"));
        }
        Ok(())
    }
}

/// Create a folder
#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Folder path ending with '/'
    pub path: String,
}

impl MkdirCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = session.provider.validate_path(&self.path).await?;
        let folder = session
            .provider
            .create_folder(&path)
            .await
            .with_context(|| format!("Failed to create folder {path}"))?;

        if format.is_json() {
            let value = serde_json::to_value(&folder).context("Failed to serialize folder")?;
            formatter.print_json(&value);
        } else {
            formatter.success(&format!("Created {}", folder.path));
            if folder.name != path.name() {
                formatter.warn(&format!(
                    "'{}' was taken; the backend named the folder '{}'",
                    path.name(),
                    folder.name
                ));
            }
        }
        Ok(())
    }
}

/// List revisions
#[derive(Debug, Args)]
pub struct RevisionsCommand {
    pub path: String,
}

impl RevisionsCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = session.provider.validate_path(&self.path).await?;
        let revisions = session
            .provider
            .revisions(&path)
            .await
            .with_context(|| format!("Failed to list revisions of {path}"))?;

        if format.is_json() {
            let value =
                serde_json::to_value(&revisions).context("Failed to serialize revisions")?;
            formatter.print_json(&value);
            return Ok(());
        }

        formatter.success(&format!("{} revision(s) of {path}", revisions.len()));
        for revision in &revisions {
            let modified = revision
                .modified
                .map(|m| m.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            formatter.info(&format!("{}  {}  {}", revision.etag, modified, revision.name));
        }
        formatter.info("Superseded versions are not kept by the delta feed");
        Ok(())
    }
}
