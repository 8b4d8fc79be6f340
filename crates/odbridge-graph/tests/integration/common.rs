//! Shared test helpers for drive API integration tests
//!
//! Provides a wiremock server, a provider pointed at it, an observer that
//! records every exchange, and builders for drive item payloads.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use odbridge_conflict::SiblingConflictResolver;
use odbridge_core::ports::{ProviderObserver, RequestEvent, ResponseEvent};
use odbridge_graph::{Addressing, OneDriveProvider, ProviderSettings};

/// Records observer events for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    pub requests: Mutex<Vec<RequestEvent>>,
    pub responses: Mutex<Vec<ResponseEvent>>,
}

impl RecordingObserver {
    #[allow(dead_code)]
    pub fn responses(&self) -> Vec<ResponseEvent> {
        self.responses.lock().unwrap().clone()
    }
}

impl ProviderObserver for RecordingObserver {
    fn on_request(&self, event: &RequestEvent) {
        self.requests.lock().unwrap().push(event.clone());
    }

    fn on_response(&self, event: &ResponseEvent) {
        self.responses.lock().unwrap().push(event.clone());
    }
}

/// A provider with identifier addressing and the default `root` alias
pub async fn setup_id_provider() -> (MockServer, OneDriveProvider, Arc<RecordingObserver>) {
    setup_provider(Addressing::IdAddressed, None).await
}

/// A provider with path addressing, optionally under a root folder path
pub async fn setup_path_provider(
    root_path: Option<&str>,
) -> (MockServer, OneDriveProvider, Arc<RecordingObserver>) {
    setup_provider(Addressing::PathAddressed, root_path).await
}

async fn setup_provider(
    addressing: Addressing,
    root_path: Option<&str>,
) -> (MockServer, OneDriveProvider, Arc<RecordingObserver>) {
    let server = MockServer::start().await;

    let mut settings = ProviderSettings::new("test-access-token")
        .with_base_url(server.uri())
        .with_addressing(addressing);
    if let Some(root_path) = root_path {
        settings = settings.with_root_path(root_path);
    }

    let observer = Arc::new(RecordingObserver::default());
    let provider = OneDriveProvider::new(settings, Arc::new(SiblingConflictResolver::new()))
        .with_observer(observer.clone());

    (server, provider, observer)
}

/// Requests the mock server has seen
pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Requests with the given method
#[allow(dead_code)]
pub async fn received_with_method(server: &MockServer, verb: &str) -> Vec<Request> {
    received(server)
        .await
        .into_iter()
        .filter(|r| r.method.as_str() == verb)
        .collect()
}

// ============================================================================
// Payload builders
// ============================================================================

/// A file item under the given parent
pub fn file_item(id: &str, name: &str, parent_id: &str, parent_path: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "size": 1024,
        "eTag": format!("etag-{id}-1"),
        "lastModifiedDateTime": "2026-01-15T10:00:00Z",
        "parentReference": {
            "id": parent_id,
            "path": parent_path
        },
        "file": { "mimeType": "application/octet-stream" }
    })
}

/// A folder item with the given (already built) children
pub fn folder_item(
    id: &str,
    name: &str,
    parent_id: &str,
    parent_path: &str,
    children: Vec<Value>,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "parentReference": {
            "id": parent_id,
            "path": parent_path
        },
        "folder": { "childCount": children.len() },
        "children": children
    })
}

/// Marks an item as soft-deleted
pub fn deleted(mut item: Value) -> Value {
    item["deleted"] = json!({ "state": "softDeleted" });
    item
}

// ============================================================================
// Mount helpers
// ============================================================================

/// Mounts `GET {endpoint}?expand=children` answering with `body`
pub async fn mount_lookup(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("expand", "children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts `GET {endpoint}?expand=children` answering with a bare status
pub async fn mount_lookup_status(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("expand", "children"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": "itemNotFound", "message": "Item does not exist" }
        })))
        .mount(server)
        .await;
}
