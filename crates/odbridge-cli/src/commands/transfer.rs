//! Content and transfer commands: get, put, cp, mv

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use futures_util::{StreamExt, TryStreamExt};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use odbridge_core::domain::{
    ByteRange, ConflictPolicy, ETag, Operation, ProviderError, TransferOutcome, UploadStream,
};
use odbridge_core::ports::StorageProvider;

use super::Session;
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Download a file
#[derive(Debug, Args)]
pub struct GetCommand {
    pub path: String,

    /// Download the revision with this ETag instead of the current content
    #[arg(long)]
    pub revision: Option<String>,

    /// Inclusive byte range, e.g. `0-99` or `100-`
    #[arg(long)]
    pub range: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GetCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let revision = self
            .revision
            .clone()
            .map(ETag::new)
            .transpose()
            .context("Invalid revision")?;
        let range = self.range.as_deref().map(parse_range).transpose()?;

        let path = session.provider.validate_path(&self.path).await?;
        let download = session
            .provider
            .download(&path, revision.as_ref(), range)
            .await
            .with_context(|| format!("Failed to download {path}"))?;
        debug!(size = ?download.size, partial = download.partial, "Download started");

        let mut stream = download.stream;
        let mut written: u64 = 0;
        match &self.output {
            Some(target) => {
                let mut file = tokio::fs::File::create(target)
                    .await
                    .with_context(|| format!("Failed to create {}", target.display()))?;
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    file.write_all(&chunk).await.context("Failed to write output")?;
                    written += chunk.len() as u64;
                }
                file.flush().await.context("Failed to write output")?;

                info!(path = %path, bytes = written, "Downloaded");
                if format.is_json() {
                    formatter.print_json(&json!({
                        "success": true,
                        "path": path.materialized(),
                        "output": target.display().to_string(),
                        "bytes": written,
                        "partial": download.partial,
                    }));
                } else {
                    formatter.success(&format!(
                        "Downloaded {path} to {} ({written} bytes)",
                        target.display()
                    ));
                }
            }
            None => {
                let mut stdout = tokio::io::stdout();
                while let Some(chunk) = stream.next().await {
                    stdout
                        .write_all(&chunk?)
                        .await
                        .context("Failed to write to stdout")?;
                }
                stdout.flush().await.context("Failed to write to stdout")?;
            }
        }
        Ok(())
    }
}

/// Upload a local file
#[derive(Debug, Args)]
pub struct PutCommand {
    /// Local file to upload
    pub local: PathBuf,

    /// Remote target path
    pub remote: String,

    /// Conflict policy: replace, rename or warn (default from config)
    #[arg(long)]
    pub conflict: Option<String>,
}

impl PutCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let policy: ConflictPolicy = match &self.conflict {
            Some(name) => name.parse().context("Invalid conflict policy")?,
            None => session.config.upload.default_conflict.clone(),
        };

        let content = open_upload(&self.local).await?;
        let path = session.provider.validate_path(&self.remote).await?;

        let (file, created) = session
            .provider
            .upload(content, &path, &policy)
            .await
            .with_context(|| format!("Failed to upload to {path}"))?;

        if format.is_json() {
            formatter.print_json(&json!({
                "success": true,
                "created": created,
                "file": file,
            }));
        } else {
            let verb = if created { "Created" } else { "Replaced" };
            formatter.success(&format!("{verb} {} ({} bytes)", file.path, file.size));
            if file.name != path.name() {
                formatter.info(&format!("Renamed from '{}' to avoid a conflict", path.name()));
            }
        }
        Ok(())
    }
}

/// Copy an item
#[derive(Debug, Args)]
pub struct CopyCommand {
    pub src: String,
    pub dst: String,
}

impl CopyCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let provider = &session.provider;
        let src = provider.validate_path(&self.src).await?;
        let dst = provider.validate_path(&self.dst).await?;

        let outcome = provider
            .intra_copy(provider, &src, &dst)
            .await
            .with_context(|| format!("Failed to copy {src} to {dst}"))?;
        report_outcome(get_formatter(format).as_ref(), format, "Copied", &outcome)
    }
}

/// Move or rename an item
#[derive(Debug, Args)]
pub struct MoveCommand {
    pub src: String,
    pub dst: String,
}

impl MoveCommand {
    pub async fn execute(&self, session: &Session, format: OutputFormat) -> Result<()> {
        let provider = &session.provider;
        let src = provider.validate_path(&self.src).await?;
        let dst = provider.validate_path(&self.dst).await?;

        let outcome = provider
            .intra_move(provider, &src, &dst)
            .await
            .with_context(|| format!("Failed to move {src} to {dst}"))?;
        report_outcome(get_formatter(format).as_ref(), format, "Moved", &outcome)
    }
}

fn report_outcome(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    verb: &str,
    outcome: &TransferOutcome,
) -> Result<()> {
    match outcome {
        TransferOutcome::Completed { metadata, created } => {
            if format.is_json() {
                formatter.print_json(&json!({
                    "status": "completed",
                    "created": created,
                    "metadata": metadata,
                }));
            } else {
                let note = if *created { "new" } else { "replaced existing" };
                formatter.success(&format!("{verb} to {} ({note})", metadata.path()));
            }
        }
        TransferOutcome::Pending {
            monitor_url,
            source_retained,
        } => {
            if format.is_json() {
                formatter.print_json(&json!({
                    "status": "pending",
                    "monitor_url": monitor_url,
                    "source_retained": source_retained,
                }));
            } else {
                formatter.success("Accepted; the backend completes it asynchronously");
                if let Some(url) = monitor_url {
                    formatter.info(&format!("Monitor: {url}"));
                }
                if *source_retained {
                    formatter.warn("The source is kept until the copy finishes; delete it then");
                }
            }
        }
    }
    Ok(())
}

/// Parses `A-B` or `A-` into a byte range
pub fn parse_range(raw: &str) -> Result<ByteRange> {
    let Some((start, end)) = raw.trim().split_once('-') else {
        bail!("Invalid range '{raw}': expected START-END or START-");
    };
    let start: u64 = start
        .parse()
        .with_context(|| format!("Invalid range start in '{raw}'"))?;
    let end = match end {
        "" => None,
        end => Some(
            end.parse::<u64>()
                .with_context(|| format!("Invalid range end in '{raw}'"))?,
        ),
    };
    if let Some(end) = end {
        if end < start {
            bail!("Invalid range '{raw}': end precedes start");
        }
    }
    Ok(ByteRange::new(start, end))
}

/// Opens `local` as a streamed upload body sized from the file's metadata
async fn open_upload(local: &Path) -> Result<UploadStream> {
    let file = tokio::fs::File::open(local)
        .await
        .with_context(|| format!("Failed to open {}", local.display()))?;
    let size = file
        .metadata()
        .await
        .with_context(|| format!("Failed to read metadata of {}", local.display()))?
        .len();
    debug!(path = %local.display(), size, "Streaming local file");

    let stream = ReaderStream::new(file).map_err(|e| ProviderError::Transport {
        operation: Operation::Upload,
        message: e.to_string(),
    });
    Ok(UploadStream {
        size,
        stream: Box::pin(stream),
    })
}
