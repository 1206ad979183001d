//! Typed request/response envelopes.
//!
//! # Design
//! A [`Pending`] pairs a wire request with the parse function for its
//! operation's result type and an opaque caller-supplied correlation token.
//! Feeding it the eventual [`HttpResponse`] yields a [`ParsedResponse`]
//! that carries the token back unchanged, so asynchronous hosts can match
//! completions to the calls that initiated them. `complete` never panics:
//! a body that fails to deserialize produces a failure-flagged response,
//! not a crash.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// A built request awaiting execution, typed by its result.
#[derive(Debug)]
pub struct Pending<T> {
    pub request: HttpRequest,
    custom: Option<Value>,
    parse: fn(&HttpResponse) -> Result<T, ApiError>,
}

impl<T> Pending<T> {
    pub(crate) fn new(request: HttpRequest, parse: fn(&HttpResponse) -> Result<T, ApiError>) -> Self {
        Self {
            request,
            custom: None,
            parse,
        }
    }

    /// Attach an opaque correlation token, returned unchanged on the
    /// [`ParsedResponse`] whether the call succeeds or fails.
    pub fn with_custom(mut self, custom: Value) -> Self {
        self.custom = Some(custom);
        self
    }

    /// Consume the response delivered by the transport.
    pub fn complete(self, response: HttpResponse) -> ParsedResponse<T> {
        let result = (self.parse)(&response);
        if let Err(ApiError::DeserializationError(msg)) = &result {
            log::warn!("response body failed to deserialize: {msg}");
        }
        let (result, error) = match result {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        ParsedResponse {
            success: result.is_some(),
            status: response.status,
            headers: response.headers,
            result,
            error,
            custom: self.custom,
        }
    }

    /// Resolve without a response, e.g. when the transport itself failed.
    pub(crate) fn fail(self, error: ApiError) -> ParsedResponse<T> {
        ParsedResponse {
            success: false,
            status: 0,
            headers: Vec::new(),
            result: None,
            error: Some(error),
            custom: self.custom,
        }
    }
}

/// The typed outcome of an executed request.
#[derive(Debug)]
pub struct ParsedResponse<T> {
    pub success: bool,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub result: Option<T>,
    pub error: Option<ApiError>,
    pub custom: Option<Value>,
}

impl<T> ParsedResponse<T> {
    /// Collapse into a plain `Result`, discarding envelope metadata.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.result, self.error) {
            (Some(value), _) => Ok(value),
            (None, Some(err)) => Err(err),
            (None, None) => Err(ApiError::DeserializationError(
                "response resolved without result or error".to_string(),
            )),
        }
    }
}

/// Map a non-expected status code to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        401 | 403 => Err(ApiError::Unauthorized),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Check the status, then deserialize the body into `T`.
pub(crate) fn decode_json<T: DeserializeOwned>(
    response: &HttpResponse,
    expected: u16,
) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}
