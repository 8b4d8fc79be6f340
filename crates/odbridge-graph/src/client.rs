//! OneDrive drive API client
//!
//! Provides a thin HTTP client for the OneDrive drive API. Handles
//! authentication headers, endpoint construction, expected-status checks and
//! observer notification; everything above it deals in [`ProviderError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use odbridge_core::domain::Operation;
//! use odbridge_graph::client::GraphClient;
//! use reqwest::{Method, StatusCode};
//!
//! # async fn example() -> Result<(), odbridge_core::domain::ProviderError> {
//! let client = GraphClient::new("access-token-here");
//! let response = client
//!     .send(
//!         Operation::Metadata,
//!         client.request(Method::GET, "/root"),
//!         &[StatusCode::OK],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use odbridge_core::config::DEFAULT_BASE_URL;
use odbridge_core::domain::{Operation, ProviderError};
use odbridge_core::ports::observer::redact_url;
use odbridge_core::ports::{ProviderObserver, RequestEvent, ResponseEvent};
use reqwest::{redirect, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::observer::TracingObserver;

// ============================================================================
// Error body
// ============================================================================

/// Error envelope returned by the drive API
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Longest raw body excerpt carried into an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Builds a readable message for an unexpected response
fn describe_failure(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let ErrorBody { code, message } = envelope.error;
        return match (code, message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => status.to_string(),
        };
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{status}: {excerpt}")
    }
}

// ============================================================================
// GraphClient
// ============================================================================

/// HTTP client for drive API calls
///
/// Wraps `reqwest::Client` with authentication headers and base URL
/// construction. Redirects are not followed, so a `302` from a content
/// endpoint can be read as a download location.
#[derive(Clone)]
pub struct GraphClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// OAuth2 access token
    access_token: String,
    /// Receives one event per request and per response
    observer: Arc<dyn ProviderObserver>,
}

impl GraphClient {
    /// Creates a new GraphClient against the public OneDrive endpoint
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Creates a new GraphClient with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the observer notified about each exchange
    pub fn with_observer(mut self, observer: Arc<dyn ProviderObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PUT, DELETE, etc.)
    /// * `path` - API path relative to base URL (e.g., "/items/{id}")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates a request builder for an absolute, pre-authenticated URL
    ///
    /// Download URLs carry their own short-lived grant; no Authorization
    /// header is attached.
    pub fn request_url(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends a request and checks its status against `expected`
    ///
    /// The observer sees the request before it leaves and the outcome after
    /// it returns. Any status outside `expected` becomes the
    /// operation-specific [`ProviderError`] carrying that status.
    ///
    /// # Errors
    /// - `ProviderError::Transport` when no response arrived
    /// - The `operation` variant of `ProviderError` for unexpected statuses
    pub async fn send(
        &self,
        operation: Operation,
        builder: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Response, ProviderError> {
        let request = builder.build().map_err(|e| ProviderError::Transport {
            operation,
            message: e.without_url().to_string(),
        })?;

        let method = request.method().to_string();
        let url = redact_url(request.url().as_str());
        self.observer.on_request(&RequestEvent {
            operation,
            method: method.clone(),
            url: url.clone(),
        });

        let started = Instant::now();
        let outcome = self.client.execute(request).await;
        let elapsed = started.elapsed();

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                self.observer.on_response(&ResponseEvent {
                    operation,
                    method,
                    url,
                    status: None,
                    expected: false,
                    elapsed,
                });
                return Err(ProviderError::Transport {
                    operation,
                    message: e.without_url().to_string(),
                });
            }
        };

        let status = response.status();
        let is_expected = expected.contains(&status);
        self.observer.on_response(&ResponseEvent {
            operation,
            method,
            url,
            status: Some(status.as_u16()),
            expected: is_expected,
            elapsed,
        });

        if is_expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::from_status(
            operation,
            status.as_u16(),
            describe_failure(status, &body),
        ))
    }
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Reads a JSON response body
///
/// # Errors
/// Returns `ProviderError::InvalidResponse` if the body cannot be read or
/// does not match `T`
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to read body: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse body: {e}")))
}
