//! Observer implementations
//!
//! [`TracingObserver`] is what a [`GraphClient`](crate::client::GraphClient)
//! uses unless told otherwise. Events never include bodies or headers.

use odbridge_core::ports::{ProviderObserver, RequestEvent, ResponseEvent};
use tracing::{debug, warn};

/// Emits one `tracing` event per request and per response
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProviderObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent) {
        debug!(
            operation = %event.operation,
            method = %event.method,
            url = %event.url,
            "Sending request"
        );
    }

    fn on_response(&self, event: &ResponseEvent) {
        let elapsed_ms = event.elapsed.as_millis() as u64;
        match event.status {
            Some(status) if event.expected => debug!(
                operation = %event.operation,
                method = %event.method,
                url = %event.url,
                status,
                elapsed_ms,
                "Received response"
            ),
            Some(status) => warn!(
                operation = %event.operation,
                method = %event.method,
                url = %event.url,
                status,
                elapsed_ms,
                "Unexpected response status"
            ),
            None => warn!(
                operation = %event.operation,
                method = %event.method,
                url = %event.url,
                elapsed_ms,
                "Request failed without a response"
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProviderObserver for NoopObserver {
    fn on_request(&self, _event: &RequestEvent) {}

    fn on_response(&self, _event: &ResponseEvent) {}
}
