//! Intra-provider move and copy
//!
//! Both are built on the backend copy action; a move that stays in the same
//! folder is a rename instead. Per call the coordinator walks
//! `Resolving -> Requesting -> {Succeeded | PendingAsync | Denied -> Retrying
//! -> {Succeeded | Failed} | Failed}`.
//!
//! A 403 means the backend refuses this particular pattern. The recovery is
//! to delete whatever sits at the destination and retry exactly once; a
//! second refusal is returned to the caller.

use std::fmt;

use odbridge_core::domain::{Operation, ProviderError, RemoteId, TransferOutcome, VirtualPath};
use reqwest::header::LOCATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::addressing::{Addressing, ItemLocator};
use crate::client::read_json;
use crate::metadata::parent_hint;
use crate::provider::Backend;

const COPY_STATUSES: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED];

/// Where a single move/copy invocation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferState {
    Resolving,
    Requesting,
    Denied,
    Retrying,
    Succeeded,
    PendingAsync,
    Failed,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Requesting => "requesting",
            Self::Denied => "denied",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::PendingAsync => "pending_async",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks and logs the state of one invocation
struct Run {
    operation: Operation,
    state: TransferState,
}

impl Run {
    fn start(operation: Operation) -> Self {
        debug!(%operation, state = %TransferState::Resolving, "Transfer started");
        Self {
            operation,
            state: TransferState::Resolving,
        }
    }

    fn enter(&mut self, next: TransferState) {
        debug!(operation = %self.operation, from = %self.state, to = %next, "Transfer state");
        self.state = next;
    }

    /// Marks the run failed and passes the error through
    fn fail(&mut self, error: ProviderError) -> ProviderError {
        self.enter(TransferState::Failed);
        error
    }
}

/// Outcome of the local checks
struct Prepared {
    src_locator: ItemLocator,
    dest_existed: bool,
    same_parent: bool,
}

/// A response from the copy or rename request, plus whether the recovery
/// step removed an existing destination
struct Applied {
    response: Response,
    destination_deleted: bool,
}

pub(crate) struct MoveCopyCoordinator<'a> {
    backend: Backend<'a>,
}

impl<'a> MoveCopyCoordinator<'a> {
    pub(crate) fn new(backend: Backend<'a>) -> Self {
        Self { backend }
    }

    /// Copies `src` to `dest`
    pub(crate) async fn copy(
        &self,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError> {
        let mut run = Run::start(Operation::IntraCopy);
        let prepared = self.prepare(src, dest).map_err(|e| run.fail(e))?;

        let applied = self
            .apply_copy(&mut run, &prepared.src_locator, src, dest)
            .await
            .map_err(|e| run.fail(e))?;

        if applied.response.status() == StatusCode::ACCEPTED {
            return Ok(self.pending(&mut run, &applied.response, false));
        }

        let outcome = self
            .completed(applied, dest, prepared.dest_existed)
            .await
            .map_err(|e| run.fail(e))?;
        run.enter(TransferState::Succeeded);
        Ok(outcome)
    }

    /// Moves `src` to `dest`
    ///
    /// Within one folder this is a rename. Across folders the item is copied
    /// and the source deleted once the copy is complete; an asynchronously
    /// accepted copy leaves the source in place.
    pub(crate) async fn move_item(
        &self,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<TransferOutcome, ProviderError> {
        let mut run = Run::start(Operation::IntraMove);
        let prepared = self.prepare(src, dest).map_err(|e| run.fail(e))?;
        let Prepared {
            src_locator,
            dest_existed,
            same_parent,
        } = prepared;

        if same_parent {
            let applied = self
                .apply_rename(&mut run, &src_locator, dest)
                .await
                .map_err(|e| run.fail(e))?;
            let outcome = self
                .completed(applied, dest, dest_existed)
                .await
                .map_err(|e| run.fail(e))?;
            run.enter(TransferState::Succeeded);
            return Ok(outcome);
        }

        let applied = self
            .apply_copy(&mut run, &src_locator, src, dest)
            .await
            .map_err(|e| run.fail(e))?;

        if applied.response.status() == StatusCode::ACCEPTED {
            return Ok(self.pending(&mut run, &applied.response, true));
        }

        let outcome = self
            .completed(applied, dest, dest_existed)
            .await
            .map_err(|e| run.fail(e))?;

        let client = self.backend.client;
        client
            .send(
                Operation::IntraMove,
                client.request(Method::DELETE, &src_locator.endpoint()),
                &[StatusCode::NO_CONTENT],
            )
            .await
            .map_err(|e| run.fail(source_left_behind(e, src, &outcome)))?;
        debug!(src = %src, "Move source removed after copy");

        run.enter(TransferState::Succeeded);
        Ok(outcome)
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Local checks before any request: case-only renames and transfers of
    /// an item onto itself are refused
    fn prepare(&self, src: &VirtualPath, dest: &VirtualPath) -> Result<Prepared, ProviderError> {
        if src.is_root() || dest.is_root() {
            return Err(ProviderError::InvalidPath(
                "The root folder cannot be moved or copied".to_string(),
            ));
        }

        let settings = self.backend.settings;
        let same_parent = same_parent(settings.addressing, &settings.root_id, src, dest)?;
        let leaf_case_only = src.name() != dest.name()
            && src.name().to_lowercase() == dest.name().to_lowercase();
        if src.differs_only_in_case(dest) || (same_parent && leaf_case_only) {
            return Err(ProviderError::InvalidPath(format!(
                "'{}' and '{}' differ only in letter case, which the backend cannot \
                 rename; add or remove characters to force a real name change",
                src.name(),
                dest.name()
            )));
        }

        if let (Some(a), Some(b)) = (src.identifier(), dest.identifier()) {
            if a == b {
                return Err(ProviderError::InvalidPath(format!(
                    "'{}' and '{}' are the same item",
                    src, dest
                )));
            }
        }

        Ok(Prepared {
            src_locator: settings.addressing.item_locator(src, &settings.root_id)?,
            dest_existed: dest.identifier().is_some(),
            same_parent,
        })
    }

    async fn apply_copy(
        &self,
        run: &mut Run,
        src_locator: &ItemLocator,
        src: &VirtualPath,
        dest: &VirtualPath,
    ) -> Result<Applied, ProviderError> {
        let settings = self.backend.settings;
        let parent = settings
            .addressing
            .parent_locator(dest, &settings.root_id)?;

        let mut body = Map::new();
        body.insert("parentReference".into(), parent.parent_reference());
        if dest.name() != src.name() {
            body.insert("name".into(), Value::String(dest.name().to_string()));
        }
        let body = Value::Object(body);
        let url = src_locator.endpoint_with("action.copy");

        self.apply(run, dest, COPY_STATUSES, || {
            self.backend.client.request(Method::POST, &url).json(&body)
        })
        .await
    }

    async fn apply_rename(
        &self,
        run: &mut Run,
        src_locator: &ItemLocator,
        dest: &VirtualPath,
    ) -> Result<Applied, ProviderError> {
        let body = json!({ "name": dest.name() });
        let url = src_locator.endpoint();

        self.apply(run, dest, &[StatusCode::OK], || {
            self.backend.client.request(Method::PATCH, &url).json(&body)
        })
        .await
    }

    /// Sends the request; on a 403, clears the destination and sends it once
    /// more
    async fn apply<F>(
        &self,
        run: &mut Run,
        dest: &VirtualPath,
        expected: &[StatusCode],
        build: F,
    ) -> Result<Applied, ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let client = self.backend.client;
        run.enter(TransferState::Requesting);

        match client.send(run.operation, build(), expected).await {
            Ok(response) => Ok(Applied {
                response,
                destination_deleted: false,
            }),
            Err(error) if error.is_capability_denied() => {
                run.enter(TransferState::Denied);
                warn!(
                    operation = %run.operation,
                    dest = %dest,
                    error = %error,
                    "Backend refused transfer; clearing destination and retrying once"
                );
                let destination_deleted = self.clear_destination(run, dest).await?;

                run.enter(TransferState::Retrying);
                let response = client.send(run.operation, build(), expected).await?;
                Ok(Applied {
                    response,
                    destination_deleted,
                })
            }
            Err(error) => Err(error),
        }
    }

    /// Deletes the item at `dest` if it was resolved to one
    async fn clear_destination(
        &self,
        run: &Run,
        dest: &VirtualPath,
    ) -> Result<bool, ProviderError> {
        let Some(dest_id) = dest.identifier() else {
            debug!(dest = %dest, "Destination unresolved; nothing to delete");
            return Ok(false);
        };

        let client = self.backend.client;
        let locator = ItemLocator::Id(dest_id.clone());
        client
            .send(
                run.operation,
                client.request(Method::DELETE, &locator.endpoint()),
                &[StatusCode::NO_CONTENT],
            )
            .await?;
        info!(dest = %dest, "Deleted existing destination before retry");
        Ok(true)
    }

    fn pending(&self, run: &mut Run, response: &Response, source_retained: bool) -> TransferOutcome {
        let monitor_url = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        run.enter(TransferState::PendingAsync);
        info!(
            operation = %run.operation,
            has_monitor = monitor_url.is_some(),
            "Transfer accepted for asynchronous completion"
        );
        TransferOutcome::Pending {
            monitor_url,
            source_retained,
        }
    }

    async fn completed(
        &self,
        applied: Applied,
        dest: &VirtualPath,
        dest_existed: bool,
    ) -> Result<TransferOutcome, ProviderError> {
        let item = read_json(applied.response).await?;
        let hint = parent_hint(dest);
        let metadata = self.backend.normalizer.entry(item, hint.as_deref())?;
        Ok(TransferOutcome::Completed {
            metadata,
            created: !dest_existed && !applied.destination_deleted,
        })
    }
}

/// Reports a failed source removal together with the copy that already
/// exists, so the caller can reconcile the duplicate
fn source_left_behind(
    error: ProviderError,
    src: &VirtualPath,
    outcome: &TransferOutcome,
) -> ProviderError {
    let copy = match outcome.metadata() {
        Some(metadata) => format!("'{}' (id {})", metadata.path(), metadata.id()),
        None => "the destination".to_string(),
    };
    let message = format!("copied to {copy} but removing source '{src}' failed: {error}");
    warn!(src = %src, copy = %copy, error = %error, "Move left source and copy in place");

    match error.code() {
        Some(code) => ProviderError::from_status(Operation::IntraMove, code, message),
        None => ProviderError::Transport {
            operation: Operation::IntraMove,
            message,
        },
    }
}

/// True when both paths live in the same folder
///
/// Equal parent names settle it; otherwise the parents are compared by the
/// locator the backend would see, so an identifier-addressed literal parent
/// matches its resolved counterpart.
fn same_parent(
    addressing: Addressing,
    root_id: &RemoteId,
    src: &VirtualPath,
    dest: &VirtualPath,
) -> Result<bool, ProviderError> {
    let (Some(a), Some(b)) = (src.parent(), dest.parent()) else {
        return Ok(false);
    };
    if a.names() == b.names() {
        return Ok(true);
    }
    Ok(addressing.parent_locator(src, root_id)? == addressing.parent_locator(dest, root_id)?)
}
