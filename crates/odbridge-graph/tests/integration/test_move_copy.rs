//! Integration tests for intra-provider move and copy
//!
//! Verifies the copy action bodies, asynchronous acceptance, move
//! reconciliation (source removal, same-folder rename), the single
//! delete-and-retry recovery on 403, and case-only rename rejection.

use std::sync::Arc;

use odbridge_conflict::SiblingConflictResolver;
use odbridge_core::domain::{ProviderError, RemoteId, TransferOutcome, VirtualPath};
use odbridge_core::ports::StorageProvider;
use odbridge_graph::{OneDriveProvider, ProviderSettings};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

const SRC_COPY: &str = "/root:/a/report.docx:/action.copy";

fn parsed(raw: &str) -> VirtualPath {
    VirtualPath::parse(raw, RemoteId::root()).unwrap()
}

fn copied_item(id: &str, name: &str) -> serde_json::Value {
    common::file_item(id, name, "B1", "/drive/root:/b")
}

/// Resolves `/b/report.docx` to the existing item `DEST1`
async fn resolved_destination(server: &MockServer, provider: &OneDriveProvider) -> VirtualPath {
    common::mount_lookup(
        server,
        "/root:/b/report.docx:",
        copied_item("DEST1", "report.docx"),
    )
    .await;
    let dest = provider.validate_path("/b/report.docx").await.unwrap();
    assert!(dest.identifier().is_some());
    dest
}

async fn mount_copy(server: &MockServer, status: u16, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path(SRC_COPY))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(copied_item("COPY1", "report.docx")),
        );
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

// ============================================================================
// Copy
// ============================================================================

#[tokio::test]
async fn test_copy_to_new_destination() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("POST"))
        .and(path(SRC_COPY))
        .and(body_json(json!({
            "parentReference": { "path": "/drive/root:/b" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(copied_item("COPY1", "report.docx")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap();

    match outcome {
        TransferOutcome::Completed { metadata, created } => {
            assert!(created);
            assert_eq!(metadata.path(), "/b/report.docx");
            assert_eq!(metadata.id().as_str(), "COPY1");
        }
        other => panic!("Expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_copy_with_new_name_sends_name() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("POST"))
        .and(path(SRC_COPY))
        .and(body_json(json!({
            "parentReference": { "path": "/drive/root:/b" },
            "name": "summary.docx"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(copied_item("COPY1", "summary.docx")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &parsed("/b/summary.docx"))
        .await
        .unwrap();

    assert_eq!(outcome.metadata().map(|m| m.name()), Some("summary.docx"));
}

#[tokio::test]
async fn test_copy_by_identifier() {
    let (server, provider, _) = common::setup_id_provider().await;

    Mock::given(method("POST"))
        .and(path("/items/ITEM1/action.copy"))
        .and(body_partial_json(json!({
            "parentReference": { "id": "FOLDERB" },
            "name": "report.docx"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_item(
            "COPY1",
            "report.docx",
            "FOLDERB",
            "/drive/root:/b",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/ITEM1"), &parsed("/FOLDERB/report.docx"))
        .await
        .unwrap();

    assert!(!outcome.is_pending());
}

#[tokio::test]
async fn test_copy_accepted_is_pending() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let monitor = format!("{}/monitor/job-1", server.uri());
    Mock::given(method("POST"))
        .and(path(SRC_COPY))
        .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
        .mount(&server)
        .await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransferOutcome::Pending {
            monitor_url: Some(monitor),
            source_retained: false,
        }
    );
}

// ============================================================================
// Move
// ============================================================================

#[tokio::test]
async fn test_move_across_folders_removes_source() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    mount_copy(&server, 201, None).await;
    Mock::given(method("DELETE"))
        .and(path("/root:/a/report.docx:"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_move(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Completed { created: true, .. }));
}

#[tokio::test]
async fn test_move_source_delete_failure_is_move_error() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    mount_copy(&server, 200, None).await;
    Mock::given(method("DELETE"))
        .and(path("/root:/a/report.docx:"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider
        .intra_move(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::IntraMove { code: 500, .. }));
    let message = err.to_string();
    assert!(message.contains("/b/report.docx"), "{message}");
    assert!(message.contains("COPY1"), "{message}");
    assert!(message.contains("/a/report.docx"), "{message}");
}

#[tokio::test]
async fn test_move_accepted_keeps_source() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("POST"))
        .and(path(SRC_COPY))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_move(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransferOutcome::Pending {
            monitor_url: None,
            source_retained: true,
        }
    );
}

#[tokio::test]
async fn test_move_within_folder_is_rename() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("PATCH"))
        .and(path("/root:/a/report.docx:"))
        .and(body_json(json!({ "name": "summary.docx" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_item(
            "ITEM1",
            "summary.docx",
            "A1",
            "/drive/root:/a",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_move(&provider, &parsed("/a/report.docx"), &parsed("/a/summary.docx"))
        .await
        .unwrap();

    assert_eq!(outcome.metadata().map(|m| m.path()), Some("/a/summary.docx"));
    assert!(common::received_with_method(&server, "POST").await.is_empty());
}

// ============================================================================
// Case-only renames and capability checks
// ============================================================================

#[tokio::test]
async fn test_case_only_rename_rejected_without_request() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let src = parsed("/a/report.docx");
    let dest = parsed("/a/Report.docx");

    let err = provider.intra_move(&provider, &src, &dest).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(err.to_string().contains("letter case"));

    let err = provider.intra_copy(&provider, &src, &dest).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPath(_)));

    assert!(common::received(&server).await.is_empty());
}

#[tokio::test]
async fn test_case_only_rename_rejected_after_resolution() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let stored = common::file_item("SRC1", "report.docx", "A1", "/drive/root:/a");
    common::mount_lookup(&server, "/root:/a/report.docx:", stored.clone()).await;
    common::mount_lookup(&server, "/root:/a/Report.docx:", stored).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let src = provider.validate_path("/a/report.docx").await.unwrap();
    let dest = provider.validate_path("/a/Report.docx").await.unwrap();
    assert_eq!(dest.identifier(), src.identifier());
    assert_eq!(dest.name(), "Report.docx");

    let err = provider.intra_copy(&provider, &src, &dest).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(err.to_string().contains("letter case"));

    let err = provider.intra_move(&provider, &src, &dest).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPath(_)));

    assert!(common::received_with_method(&server, "POST").await.is_empty());
    assert!(common::received_with_method(&server, "DELETE").await.is_empty());
    assert!(common::received_with_method(&server, "PATCH").await.is_empty());
}

#[tokio::test]
async fn test_transfer_onto_itself_rejected() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    common::mount_lookup(
        &server,
        "/root:/a/report.docx:",
        common::file_item("SRC1", "report.docx", "A1", "/drive/root:/a"),
    )
    .await;

    let src = provider.validate_path("/a/report.docx").await.unwrap();

    let err = provider.intra_copy(&provider, &src, &src).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(err.to_string().contains("same item"));
    assert_eq!(common::received(&server).await.len(), 1);
}

#[tokio::test]
async fn test_root_cannot_be_moved() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let err = provider
        .intra_move(&provider, &parsed("/"), &parsed("/b/"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(common::received(&server).await.is_empty());
}

#[tokio::test]
async fn test_move_to_other_account_refused() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let other = OneDriveProvider::new(
        ProviderSettings::new("other-token")
            .with_base_url(server.uri())
            .with_root_id(RemoteId::new("OTHERROOT".to_string()).unwrap()),
        Arc::new(SiblingConflictResolver::new()),
    );

    assert!(provider.can_intra_copy(&other));
    assert!(!provider.can_intra_move(&other));
    assert!(provider.can_intra_move(&provider));
    assert!(!provider.can_duplicate_names());

    let err = provider
        .intra_move(&other, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::IntraMove { code: 400, .. }));
    assert!(common::received(&server).await.is_empty());
}

// ============================================================================
// Capability-denied recovery
// ============================================================================

#[tokio::test]
async fn test_denied_copy_clears_destination_and_retries_once() {
    let (server, provider, _) = common::setup_path_provider(None).await;
    let dest = resolved_destination(&server, &provider).await;

    mount_copy(&server, 403, Some(1)).await;
    mount_copy(&server, 200, None).await;
    Mock::given(method("DELETE"))
        .and(path("/items/DEST1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &dest)
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Completed { created: false, .. }));
    assert_eq!(common::received_with_method(&server, "POST").await.len(), 2);
}

#[tokio::test]
async fn test_second_denial_propagates() {
    let (server, provider, _) = common::setup_path_provider(None).await;
    let dest = resolved_destination(&server, &provider).await;

    mount_copy(&server, 403, None).await;
    Mock::given(method("DELETE"))
        .and(path("/items/DEST1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::IntraCopy { code: 403, .. }));
    assert_eq!(common::received_with_method(&server, "POST").await.len(), 2);
}

#[tokio::test]
async fn test_retry_failure_propagates_unchanged() {
    let (server, provider, _) = common::setup_path_provider(None).await;
    let dest = resolved_destination(&server, &provider).await;

    mount_copy(&server, 403, Some(1)).await;
    mount_copy(&server, 500, None).await;
    Mock::given(method("DELETE"))
        .and(path("/items/DEST1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::IntraCopy { code: 500, .. }));
}

#[tokio::test]
async fn test_denied_with_unresolved_destination_retries_without_delete() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    mount_copy(&server, 403, Some(1)).await;
    mount_copy(&server, 201, None).await;

    let outcome = provider
        .intra_copy(&provider, &parsed("/a/report.docx"), &parsed("/b/report.docx"))
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Completed { created: true, .. }));
    assert!(common::received_with_method(&server, "DELETE").await.is_empty());
    assert_eq!(common::received_with_method(&server, "POST").await.len(), 2);
}

#[tokio::test]
async fn test_denied_rename_clears_destination() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    common::mount_lookup(
        &server,
        "/root:/a/summary.docx:",
        common::file_item("DEST2", "summary.docx", "A1", "/drive/root:/a"),
    )
    .await;
    let dest = provider.validate_path("/a/summary.docx").await.unwrap();

    Mock::given(method("PATCH"))
        .and(path("/root:/a/report.docx:"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/root:/a/report.docx:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_item(
            "ITEM1",
            "summary.docx",
            "A1",
            "/drive/root:/a",
        )))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/DEST2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider
        .intra_move(&provider, &parsed("/a/report.docx"), &dest)
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Completed { created: false, .. }));
}
