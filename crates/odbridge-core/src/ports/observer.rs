//! Observability port
//!
//! Adapters report each backend exchange to an injected observer instead of
//! logging request and response bodies globally. Events carry no bodies and
//! no credentials; URLs are passed without their query string.

use std::time::Duration;

use crate::domain::Operation;

/// A request about to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub operation: Operation,
    pub method: String,
    /// Scheme, host and path only
    pub url: String,
}

/// A response (or transport failure) for a previously reported request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEvent {
    pub operation: Operation,
    pub method: String,
    pub url: String,
    /// `None` when the request failed before a status arrived
    pub status: Option<u16>,
    /// Whether the status was one the operation expects
    pub expected: bool,
    pub elapsed: Duration,
}

/// Receives structured events for backend exchanges
pub trait ProviderObserver: Send + Sync {
    fn on_request(&self, event: &RequestEvent);

    fn on_response(&self, event: &ResponseEvent);
}

/// Strips the query string and fragment from a URL for reporting
///
/// Download URLs carry short-lived access grants in their query strings.
pub fn redact_url(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_string()
}
