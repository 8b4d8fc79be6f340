//! Integration tests for downloads and revisions
//!
//! - The current download URL comes from the content endpoint (JSON link or
//!   redirect) and is fetched without the bearer token
//! - Ranged downloads report partial content
//! - Revision downloads look the ETag up in the delta feed

use odbridge_core::domain::{ByteRange, ETag, ProviderError, RemoteId, VirtualPath};
use odbridge_core::ports::StorageProvider;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn item_path() -> VirtualPath {
    VirtualPath::parse("/ITEM1", RemoteId::root()).unwrap()
}

async fn mount_content_link(server: &MockServer, download_path: &str) {
    Mock::given(method("GET"))
        .and(path("/items/ITEM1/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@content.downloadUrl": format!("{}{download_path}?tempauth=secret", server.uri())
        })))
        .mount(server)
        .await;
}

async fn mount_delta(server: &MockServer, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/items/ITEM1/view.delta"))
        .and(query_param("top", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": items })))
        .mount(server)
        .await;
}

fn delta_entry(etag: &str, download_path: &str, server: &MockServer) -> serde_json::Value {
    json!({
        "id": "ITEM1",
        "name": "report.docx",
        "eTag": etag,
        "lastModifiedDateTime": "2026-01-15T10:00:00Z",
        "file": {},
        "@content.downloadUrl": format!("{}{download_path}", server.uri())
    })
}

#[tokio::test]
async fn test_download_current_content() {
    let (server, provider, observer) = common::setup_id_provider().await;

    mount_content_link(&server, "/dl/item1").await;
    Mock::given(method("GET"))
        .and(path("/dl/item1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let download = provider.download(&item_path(), None, None).await.unwrap();
    assert!(!download.partial);
    assert_eq!(download.size, Some(5));
    assert_eq!(download.read_all().await.unwrap(), b"hello");

    let fetch = common::received(&server)
        .await
        .into_iter()
        .find(|r| r.url.path() == "/dl/item1")
        .unwrap();
    assert!(fetch.headers.get("authorization").is_none());

    // The short-lived grant never reaches the observer
    let responses = observer.responses();
    assert!(responses.iter().all(|e| !e.url.contains("tempauth")));
}

#[tokio::test]
async fn test_download_follows_redirect_location() {
    let (server, provider, _) = common::setup_id_provider().await;

    Mock::given(method("GET"))
        .and(path("/items/ITEM1/content"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/dl/redirected", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/redirected"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"moved".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let download = provider.download(&item_path(), None, None).await.unwrap();
    assert_eq!(download.read_all().await.unwrap(), b"moved");
}

#[tokio::test]
async fn test_ranged_download_is_partial() {
    let (server, provider, _) = common::setup_id_provider().await;

    mount_content_link(&server, "/dl/item1").await;
    Mock::given(method("GET"))
        .and(path("/dl/item1"))
        .and(header("range", "bytes=0-3"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(b"hell".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let download = provider
        .download(&item_path(), None, Some(ByteRange::new(0, Some(3))))
        .await
        .unwrap();

    assert!(download.partial);
    assert_eq!(download.read_all().await.unwrap(), b"hell");
}

#[tokio::test]
async fn test_missing_download_link_is_not_found() {
    let (server, provider, _) = common::setup_id_provider().await;

    Mock::given(method("GET"))
        .and(path("/items/ITEM1/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = provider.download(&item_path(), None, None).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn test_download_fetch_failure() {
    let (server, provider, _) = common::setup_id_provider().await;

    mount_content_link(&server, "/dl/item1").await;
    Mock::given(method("GET"))
        .and(path("/dl/item1"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let err = provider.download(&item_path(), None, None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Download { code: 410, .. }));
}

#[tokio::test]
async fn test_download_known_revision() {
    let (server, provider, _) = common::setup_id_provider().await;

    mount_delta(
        &server,
        json!([
            common::deleted(delta_entry("etag-v1", "/dl/v1-deleted", &server)),
            delta_entry("etag-v2", "/dl/v2", &server),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dl/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"v2".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let etag = ETag::new("etag-v2".to_string()).unwrap();
    let download = provider
        .download(&item_path(), Some(&etag), None)
        .await
        .unwrap();

    assert_eq!(download.read_all().await.unwrap(), b"v2");
}

#[tokio::test]
async fn test_download_unknown_revision_is_not_found() {
    let (server, provider, _) = common::setup_id_provider().await;

    mount_delta(
        &server,
        json!([
            common::deleted(delta_entry("etag-v1", "/dl/v1", &server)),
            delta_entry("etag-v2", "/dl/v2", &server),
        ]),
    )
    .await;

    // A deleted entry does not count even when its tag matches
    let etag = ETag::new("etag-v1".to_string()).unwrap();
    let err = provider
        .download(&item_path(), Some(&etag), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NotFound(_)));
    assert!(err.to_string().contains("etag-v1"));
    assert_eq!(common::received(&server).await.len(), 1);
}

#[tokio::test]
async fn test_revisions_skip_deleted_entries() {
    let (server, provider, _) = common::setup_id_provider().await;

    mount_delta(
        &server,
        json!([
            delta_entry("etag-v3", "/dl/v3", &server),
            common::deleted(delta_entry("etag-v1", "/dl/v1", &server)),
            { "id": "ITEM1", "name": "report.docx" }
        ]),
    )
    .await;

    let revisions = provider.revisions(&item_path()).await.unwrap();

    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].etag.as_str(), "etag-v3");
    assert_eq!(revisions[0].item_id.as_str(), "ITEM1");
    assert_eq!(revisions[0].name, "report.docx");
    assert!(revisions[0].modified.is_some());
    assert!(revisions[0].download_url.is_some());
}

#[tokio::test]
async fn test_revisions_honour_page_size() {
    let server = MockServer::start().await;
    let settings = odbridge_graph::ProviderSettings::new("test-access-token")
        .with_base_url(server.uri())
        .with_delta_page_size(10);
    let provider = odbridge_graph::OneDriveProvider::new(
        settings,
        std::sync::Arc::new(odbridge_conflict::SiblingConflictResolver::new()),
    );

    Mock::given(method("GET"))
        .and(path("/items/ITEM1/view.delta"))
        .and(query_param("top", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [],
            "@odata.nextLink": format!("{}/items/ITEM1/view.delta?token=next", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    let revisions = provider.revisions(&item_path()).await.unwrap();
    assert!(revisions.is_empty());
}

#[tokio::test]
async fn test_revisions_unexpected_status() {
    let (server, provider, _) = common::setup_id_provider().await;

    Mock::given(method("GET"))
        .and(path("/items/ITEM1/view.delta"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider.revisions(&item_path()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Revisions { code: 500, .. }));
}
