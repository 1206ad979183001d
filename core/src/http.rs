//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network — the caller (host or a [`crate::Connector`])
//! is responsible for executing the actual I/O. This separation keeps the
//! core deterministic and easy to test, and maps cleanly to a C FFI boundary.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns. A request body is either serialized
//! JSON or a flat multipart form; the [`RequestBody`] enum makes the two
//! mutually exclusive by construction.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched when encoding path segments and query values:
/// the RFC 3986 unreserved set. Everything else is percent-encoded.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Value of a single form field: either plain text or raw file content
/// with its filename and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        data: Vec<u8>,
        filename: String,
        content_type: String,
    },
}

/// A named field in a form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.to_string()),
        }
    }

    pub fn file(name: &str, data: Vec<u8>, filename: &str, content_type: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::File {
                data,
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            },
        }
    }
}

/// Request payload: serialized JSON or flat form fields, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Json(String),
    Form(Vec<FormPart>),
}

/// An HTTP request described as plain data.
///
/// Built by `build_*` client methods. The caller is responsible for
/// executing this request against the network and returning the
/// corresponding `HttpResponse`. `timeout`, when set, is forwarded to
/// the executing transport; this layer never enforces it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// The URL with the query string appended, values percent-encoded.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let mut out = self.url.clone();
        for (i, (key, value)) in self.query.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.extend(utf8_percent_encode(key, COMPONENT));
            out.push('=');
            out.extend(utf8_percent_encode(value, COMPONENT));
        }
        out
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then fed to
/// `parse_*` methods (or [`crate::Pending::complete`]) for deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
