//! Error types for the service clients.
//!
//! # Design
//! Caller-contract violations (`MissingParameter`, `ConflictingParameters`)
//! are returned synchronously from `build_*` methods — nothing reaches the
//! network. Everything else describes an outcome of executing a request.
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! frequently branch on them; all other non-expected statuses land in
//! `HttpError` with the raw status code and body for debugging.

use std::fmt;

/// Errors produced while building requests or parsing responses.
#[derive(Debug)]
pub enum ApiError {
    /// A required argument was absent or empty. Returned before any
    /// request value is produced.
    MissingParameter(&'static str),

    /// Mutually exclusive arguments were both supplied, or a mandatory
    /// one-of group was left empty.
    ConflictingParameters(&'static str),

    /// The server returned 404 — the addressed resource does not exist.
    NotFound,

    /// The server returned 401 or 403 — credentials missing or rejected.
    Unauthorized,

    /// The server returned a non-expected status other than the above.
    HttpError { status: u16, body: String },

    /// A 200 response whose body reports a service-level rejection
    /// (legacy family `"status": "ERROR"` convention).
    ServiceError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The connector reported a transport failure; no response arrived.
    Network(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingParameter(name) => {
                write!(f, "missing required parameter: {name}")
            }
            ApiError::ConflictingParameters(names) => {
                write!(f, "conflicting parameters: {names}")
            }
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::Unauthorized => write!(f, "credentials missing or rejected"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::ServiceError(info) => {
                write!(f, "service rejected the request: {info}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::Network(msg) => write!(f, "transport failure: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
