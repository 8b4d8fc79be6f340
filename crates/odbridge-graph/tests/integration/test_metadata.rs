//! Integration tests for metadata, delete and folder creation
//!
//! Verifies normalization of file and folder records (soft-deleted items
//! never reach the caller) and the status handling of delete and
//! create_folder.

use odbridge_core::domain::{
    Metadata, MetadataResult, Operation, ProviderError, RemoteId, VirtualPath,
};
use odbridge_core::ports::StorageProvider;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_file_metadata() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    common::mount_lookup(
        &server,
        "/root:/Documents/report.docx:",
        common::file_item("ITEM1", "report.docx", "DOCS", "/drive/root:/Documents"),
    )
    .await;

    let path = provider
        .validate_path("/Documents/report.docx")
        .await
        .unwrap();
    let result = provider.metadata(&path).await.unwrap();

    let MetadataResult::File(file) = result else {
        panic!("Expected a file, got {result:?}");
    };
    assert_eq!(file.id.as_str(), "ITEM1");
    assert_eq!(file.name, "report.docx");
    assert_eq!(file.path, "/Documents/report.docx");
    assert_eq!(file.size, 1024);
    assert_eq!(file.etag.as_ref().map(|e| e.as_str()), Some("etag-ITEM1-1"));
    assert_eq!(file.content_type.as_deref(), Some("application/octet-stream"));
    assert!(file.modified.is_some());
}

#[tokio::test]
async fn test_listing_filters_deleted_children() {
    let (server, provider, _) = common::setup_id_provider().await;

    let parent_path = "/drive/root:/projects";
    common::mount_lookup(
        &server,
        "/items/FOLDER1",
        common::folder_item(
            "FOLDER1",
            "projects",
            "ROOTID",
            "/drive/root:",
            vec![
                common::file_item("A", "a.txt", "FOLDER1", parent_path),
                common::deleted(common::file_item("B", "b.txt", "FOLDER1", parent_path)),
                common::folder_item("C", "c", "FOLDER1", parent_path, vec![]),
            ],
        ),
    )
    .await;

    let path = provider.validate_path("/FOLDER1/").await.unwrap();
    let result = provider.metadata(&path).await.unwrap();

    assert_eq!(result.names(), vec!["a.txt", "c"]);
    let MetadataResult::Listing(entries) = result else {
        panic!("Expected a listing");
    };
    assert!(matches!(&entries[0], Metadata::File(f) if f.path == "/projects/a.txt"));
    assert!(matches!(&entries[1], Metadata::Folder(f) if f.path == "/projects/c/"));
}

#[tokio::test]
async fn test_root_listing() {
    let (server, provider, _) = common::setup_id_provider().await;

    let mut root = json!({
        "id": "ROOTID",
        "name": "root",
        "folder": { "childCount": 1 },
        "children": [common::file_item("A", "a.txt", "ROOTID", "/drive/root:")]
    });
    root["root"] = json!({});
    common::mount_lookup(&server, "/items/root", root).await;

    let path = provider.validate_path("/").await.unwrap();
    let result = provider.metadata(&path).await.unwrap();

    let MetadataResult::Listing(entries) = result else {
        panic!("Expected a listing");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path(), "/a.txt");
}

#[tokio::test]
async fn test_deleted_item_is_not_found() {
    let (server, provider, _) = common::setup_id_provider().await;

    let item = common::deleted(common::file_item("ITEM1", "old.txt", "ROOTID", "/drive/root:"));
    common::mount_lookup(&server, "/items/ITEM1", item).await;

    let path = provider.validate_path("/ITEM1").await.unwrap();
    let err = provider.metadata(&path).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, ProviderError::Metadata { code: 404, .. }));
    assert!(err.to_string().contains("/old.txt"));
}

#[tokio::test]
async fn test_delete_then_lookup_is_not_found() {
    let (server, provider, observer) = common::setup_id_provider().await;

    Mock::given(method("DELETE"))
        .and(path("/items/ITEM1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    common::mount_lookup_status(&server, "/items/ITEM1", 404).await;

    let path = provider.validate_path("/ITEM1").await.unwrap();
    provider.delete(&path).await.unwrap();

    let err = provider.metadata(&path).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!provider.exists(&path).await.unwrap());

    let deletes: Vec<_> = observer
        .responses()
        .into_iter()
        .filter(|e| e.operation == Operation::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].expected);
}

#[tokio::test]
async fn test_delete_unexpected_status() {
    let (server, provider, _) = common::setup_id_provider().await;

    Mock::given(method("DELETE"))
        .and(path("/items/ITEM1"))
        .respond_with(ResponseTemplate::new(423).set_body_json(json!({
            "error": { "code": "resourceLocked", "message": "The resource is locked" }
        })))
        .mount(&server)
        .await;

    let path = VirtualPath::parse("/ITEM1", RemoteId::root()).unwrap();
    let err = provider.delete(&path).await.unwrap_err();

    match err {
        ProviderError::Delete { code, message } => {
            assert_eq!(code, 423);
            assert!(message.contains("resourceLocked"));
        }
        other => panic!("Expected Delete error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_root_refused() {
    let (server, provider, _) = common::setup_id_provider().await;

    let root = provider.validate_path("/").await.unwrap();
    let err = provider.delete(&root).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(common::received(&server).await.is_empty());
}

#[tokio::test]
async fn test_create_folder_by_identifier() {
    let (server, provider, _) = common::setup_id_provider().await;

    common::mount_lookup_status(&server, "/items/2024", 404).await;
    Mock::given(method("POST"))
        .and(path("/items/PARENTID/children"))
        .and(body_partial_json(json!({
            "name": "2024",
            "folder": {},
            "@name.conflictBehavior": "rename"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::folder_item(
            "NEWFOLDER",
            "2024",
            "PARENTID",
            "/drive/root:/projects",
            vec![],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let path = provider.validate_path("/PARENTID/2024/").await.unwrap();
    let folder = provider.create_folder(&path).await.unwrap();

    assert_eq!(folder.name, "2024");
    assert_eq!(folder.id.as_str(), "NEWFOLDER");
    assert_eq!(folder.path, "/projects/2024/");
    assert!(folder.children.is_empty());
}

#[tokio::test]
async fn test_create_folder_by_path() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("POST"))
        .and(path("/root:/projects:/children"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::folder_item(
            "NEWFOLDER",
            "2024",
            "PROJECTS",
            "/drive/root:/projects",
            vec![],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let path = VirtualPath::parse("/projects/2024/", RemoteId::root())
        .unwrap();
    let folder = provider.create_folder(&path).await.unwrap();

    assert_eq!(folder.name, "2024");
    assert_eq!(folder.path, "/projects/2024/");
}

#[tokio::test]
async fn test_create_folder_requires_folder_path() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    let path = VirtualPath::parse("/projects/2024", RemoteId::root())
        .unwrap();
    let err = provider.create_folder(&path).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidPath(_)));
    assert!(common::received(&server).await.is_empty());
}

#[tokio::test]
async fn test_create_folder_conflict_status() {
    let (server, provider, _) = common::setup_path_provider(None).await;

    Mock::given(method("POST"))
        .and(path("/root/children"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let path = VirtualPath::parse("/2024/", RemoteId::root()).unwrap();
    let err = provider.create_folder(&path).await.unwrap_err();

    assert!(matches!(err, ProviderError::CreateFolder { code: 409, .. }));
}
