//! Connector trait and the dispatch loop around it.
//!
//! # Design
//! The actual HTTP transport is an external collaborator. Hosts either
//! execute [`crate::HttpRequest`] values themselves and feed responses back
//! through [`Pending::complete`], or implement [`Connector`] with whatever
//! HTTP library they prefer and let [`Dispatcher::dispatch`] drive the
//! completion closure. The dispatcher holds no session state and provides
//! no ordering between calls; retry, pooling, and timeouts belong to the
//! connector.

use std::fmt;

use crate::envelope::{ParsedResponse, Pending};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// A transport failure reported by a [`Connector`]; no response arrived.
#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Synchronous HTTP transport supplied by the embedding application.
pub trait Connector {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Drives a [`Pending`] request through a connector and delivers the
/// [`ParsedResponse`] to a completion closure exactly once.
pub struct Dispatcher<C> {
    connector: Option<C>,
}

impl<C: Connector> Dispatcher<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Some(connector),
        }
    }

    /// A dispatcher with no usable transport, e.g. when credentials never
    /// resolved. Every `dispatch` returns `false` without side effects.
    pub fn unavailable() -> Self {
        Self { connector: None }
    }

    /// Submit `pending` for execution.
    ///
    /// Returns `false` when no connector is available: nothing was sent
    /// and `on_complete` is never invoked. Returns `true` once the request
    /// was handed to the connector; `on_complete` then fires exactly once,
    /// receiving transport and deserialization failures as failure-flagged
    /// responses rather than panics.
    pub fn dispatch<T>(
        &self,
        pending: Pending<T>,
        on_complete: impl FnOnce(ParsedResponse<T>),
    ) -> bool {
        let Some(connector) = &self.connector else {
            return false;
        };
        log::debug!(
            "dispatching {:?} {}",
            pending.request.method,
            pending.request.url
        );
        let parsed = match connector.send(&pending.request) {
            Ok(response) => pending.complete(response),
            Err(err) => pending.fail(ApiError::Network(err.to_string())),
        };
        on_complete(parsed);
        true
    }
}
