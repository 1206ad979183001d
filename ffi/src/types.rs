//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers with explicit lengths
//! instead of `Vec`, and tagged enums with explicit discriminants.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface. File bytes travel as boxed slices so length and
//! capacity coincide when they are reclaimed.

use std::ffi::CString;
use std::os::raw::c_char;

use cortex_core::error::ApiError;
use cortex_core::http::{FormValue, HttpMethod, RequestBody};
use cortex_core::types::{Collection, DeleteDocumentResponse, DocumentAccepted, QueryResponse};

/// Opaque handle to a discovery client. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiCortexClient {
    pub(crate) inner: cortex_core::DiscoveryClient,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// What `FfiHttpRequest` carries as its payload.
#[repr(C)]
#[derive(PartialEq, Eq)]
pub enum FfiBodyTag {
    None = 0,
    Json = 1,
    Form = 2,
}

/// One form field: plain text, or file bytes with filename and content
/// type when `is_file` is set.
#[repr(C)]
pub struct FfiFormPart {
    pub name: *mut c_char,
    pub is_file: bool,
    pub text: *mut c_char,
    pub data: *mut u8,
    pub data_len: u32,
    pub filename: *mut c_char,
    pub content_type: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `cortex_build_*` functions. `url` already contains the
/// percent-encoded query string. The C caller executes the request and
/// passes the response back through `cortex_parse_*`. `timeout_ms` is 0
/// when no explicit timeout was requested.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body_tag: FfiBodyTag,
    pub json_body: *mut c_char,
    pub form_parts: *mut FfiFormPart,
    pub form_parts_len: u32,
    pub timeout_ms: u64,
}

fn into_c_string(value: String) -> *mut c_char {
    CString::new(value).unwrap_or_default().into_raw()
}

fn leak_vec<T>(mut values: Vec<T>) -> *mut T {
    if values.is_empty() {
        return std::ptr::null_mut();
    }
    let ptr = values.as_mut_ptr();
    std::mem::forget(values);
    ptr
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: cortex_core::HttpRequest) -> *mut Self {
        let url = into_c_string(req.full_url());
        let timeout_ms = req.timeout.map(|t| t.as_millis() as u64).unwrap_or(0);

        let headers_len = req.headers.len() as u32;
        let headers = leak_vec(
            req.headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect::<Vec<_>>(),
        );

        let (body_tag, json_body, form_parts, form_parts_len) = match req.body {
            None => (FfiBodyTag::None, std::ptr::null_mut(), std::ptr::null_mut(), 0),
            Some(RequestBody::Json(raw)) => (
                FfiBodyTag::Json,
                into_c_string(raw),
                std::ptr::null_mut(),
                0,
            ),
            Some(RequestBody::Form(parts)) => {
                let len = parts.len() as u32;
                let ffi_parts: Vec<FfiFormPart> =
                    parts.into_iter().map(FfiFormPart::from_core).collect();
                (FfiBodyTag::Form, std::ptr::null_mut(), leak_vec(ffi_parts), len)
            }
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body_tag,
            json_body,
            form_parts,
            form_parts_len,
            timeout_ms,
        }))
    }
}

impl FfiFormPart {
    fn from_core(part: cortex_core::FormPart) -> Self {
        match part.value {
            FormValue::Text(text) => FfiFormPart {
                name: into_c_string(part.name),
                is_file: false,
                text: into_c_string(text),
                data: std::ptr::null_mut(),
                data_len: 0,
                filename: std::ptr::null_mut(),
                content_type: std::ptr::null_mut(),
            },
            FormValue::File {
                data,
                filename,
                content_type,
            } => {
                let data_len = data.len() as u32;
                let boxed = data.into_boxed_slice();
                FfiFormPart {
                    name: into_c_string(part.name),
                    is_file: true,
                    text: std::ptr::null_mut(),
                    data: Box::into_raw(boxed) as *mut u8,
                    data_len,
                    filename: into_c_string(filename),
                    content_type: into_c_string(content_type),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP
/// request, then passes a pointer to a `cortex_parse_*` function. The FFI
/// layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCortexResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    MissingParameter = 1,
    ConflictingParameters = 2,
    NotFound = 3,
    Unauthorized = 4,
    Http = 5,
    Service = 6,
    Serialization = 7,
    Deserialization = 8,
    Network = 9,
    Panic = 10,
    NullArg = 11,
}

/// Tag that tells `cortex_free_result` what `FfiCortexResult::data`
/// points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    CollectionList = 1,
    Document = 2,
    Json = 3,
}

/// A collection record exposed to C.
#[repr(C)]
pub struct FfiCollection {
    pub collection_id: *mut c_char,
    pub name: *mut c_char,
    /// Raw RFC 3339 timestamp, or null when the service omitted it.
    pub created: *mut c_char,
}

/// A list of collections exposed to C.
#[repr(C)]
pub struct FfiCollectionList {
    pub items: *mut FfiCollection,
    pub len: u32,
}

/// Receipt for document add/update/delete operations.
#[repr(C)]
pub struct FfiDocumentReceipt {
    pub document_id: *mut c_char,
    pub status: *mut c_char,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiCortexResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

fn optional_c_string(value: Option<String>) -> *mut c_char {
    match value {
        Some(v) => into_c_string(v),
        None => std::ptr::null_mut(),
    }
}

impl FfiCortexResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCortexResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiCollectionList`.
    pub(crate) fn ok_collections(collections: Vec<Collection>) -> *mut Self {
        let len = collections.len() as u32;
        let items = leak_vec(
            collections
                .into_iter()
                .map(|c| FfiCollection {
                    collection_id: into_c_string(c.collection_id),
                    name: into_c_string(c.name),
                    created: optional_c_string(c.created),
                })
                .collect::<Vec<_>>(),
        );
        let list = Box::new(FfiCollectionList { items, len });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::CollectionList,
            Box::into_raw(list) as *mut std::ffi::c_void,
        )
    }

    /// Build a success result carrying an `FfiDocumentReceipt`.
    pub(crate) fn ok_document(document_id: Option<String>, status: Option<String>) -> *mut Self {
        let receipt = Box::new(FfiDocumentReceipt {
            document_id: optional_c_string(document_id),
            status: optional_c_string(status),
        });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Document,
            Box::into_raw(receipt) as *mut std::ffi::c_void,
        )
    }

    pub(crate) fn ok_accepted(receipt: DocumentAccepted) -> *mut Self {
        Self::ok_document(receipt.document_id, receipt.status)
    }

    pub(crate) fn ok_deleted(receipt: DeleteDocumentResponse) -> *mut Self {
        Self::ok_document(receipt.document_id, receipt.status)
    }

    /// Build a success result carrying the query response re-serialized
    /// to a JSON C string; matched documents have no fixed shape, it
    /// depends on the collection schema.
    pub(crate) fn ok_query(value: &QueryResponse) -> *mut Self {
        match serde_json::to_string(value) {
            Ok(raw) => Self::boxed(
                FfiErrorCode::Ok,
                std::ptr::null_mut(),
                0,
                FfiDataTag::Json,
                into_c_string(raw) as *mut std::ffi::c_void,
            ),
            Err(err) => Self::from_error(ApiError::SerializationError(err.to_string())),
        }
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::MissingParameter(_) => (FfiErrorCode::MissingParameter, 0),
            ApiError::ConflictingParameters(_) => (FfiErrorCode::ConflictingParameters, 0),
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::Unauthorized => (FfiErrorCode::Unauthorized, 401),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::ServiceError(_) => (FfiErrorCode::Service, 200),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::Network(_) => (FfiErrorCode::Network, 0),
        };
        Self::boxed(
            error_code,
            into_c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            into_c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            into_c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}
