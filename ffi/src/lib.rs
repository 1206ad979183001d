//! C-ABI wrapper around `cortex-core`'s discovery client.
//!
//! # Overview
//! Exposes the discovery request builders and response parsers through
//! `extern "C"` functions so a host application with a C FFI (a game
//! engine's native plugin loader, typically) can build and parse HTTP
//! requests/responses without linking to Rust's serde machinery directly.
//! The host owns the actual network round-trip, exactly as in the core.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so
//!   panics never cross the FFI boundary.
//! - Per-operation `cortex_build_*` / `cortex_parse_*` mirrors the core
//!   API. Build failures (missing or conflicting parameters) surface as
//!   null returns; parse failures as tagged error envelopes.
//! - A single `FfiCortexResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `cortex_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use cortex_core::http::HttpResponse;
use cortex_core::types::{DocumentInput, QueryParams};
use cortex_core::{Credentials, DiscoveryClient, DiscoveryConfig};

use types::*;

fn c_str(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or("")
        .to_string()
}

fn optional_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(c_str(ptr))
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a discovery client bound to `base_url`, `version` and a bearer
/// token.
///
/// Returns null if any argument is null or if an internal panic occurs.
/// The caller must free the returned pointer with `cortex_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_client_new(
    base_url: *const c_char,
    version: *const c_char,
    bearer_token: *const c_char,
) -> *mut FfiCortexClient {
    catch_unwind(|| {
        if base_url.is_null() || version.is_null() || bearer_token.is_null() {
            return std::ptr::null_mut();
        }
        let config = DiscoveryConfig::new(
            &c_str(base_url),
            &c_str(version),
            Credentials::BearerToken(c_str(bearer_token)),
        );
        Box::into_raw(Box::new(FfiCortexClient {
            inner: DiscoveryClient::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `cortex_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_client_free(client: *mut FfiCortexClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build an HTTP request listing the collections of a project.
///
/// Returns null if `client` or `project_id` is null, or if `project_id`
/// is empty. The caller must free the returned pointer with
/// `cortex_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_build_list_collections(
    client: *const FfiCortexClient,
    project_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || project_id.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_list_collections(&c_str(project_id)) {
            Ok(pending) => FfiHttpRequest::from_core(pending.request),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a project query request.
///
/// `natural_language_query` and `query` may each be null; supplying both
/// is a caller error and returns null. `count` uses -1 to skip.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_build_query(
    client: *const FfiCortexClient,
    project_id: *const c_char,
    natural_language_query: *const c_char,
    query: *const c_char,
    count: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || project_id.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let params = QueryParams {
            natural_language_query: optional_c_str(natural_language_query),
            query: optional_c_str(query),
            count: if count < 0 { None } else { Some(count as u64) },
            ..Default::default()
        };
        match client.inner.build_query(&c_str(project_id), &params) {
            Ok(pending) => FfiHttpRequest::from_core(pending.request),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a multipart document-ingestion request.
///
/// `metadata` may be null (omitted from the form entirely). Returns null
/// on null/empty required arguments.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_build_add_document(
    client: *const FfiCortexClient,
    project_id: *const c_char,
    collection_id: *const c_char,
    file_data: *const u8,
    file_len: u32,
    filename: *const c_char,
    content_type: *const c_char,
    metadata: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null()
            || project_id.is_null()
            || collection_id.is_null()
            || file_data.is_null()
            || filename.is_null()
            || content_type.is_null()
        {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let file = unsafe { std::slice::from_raw_parts(file_data, file_len as usize) }.to_vec();
        let input = DocumentInput {
            file,
            filename: c_str(filename),
            content_type: c_str(content_type),
            metadata: optional_c_str(metadata),
        };
        match client
            .inner
            .build_add_document(&c_str(project_id), &c_str(collection_id), &input)
        {
            Ok(pending) => FfiHttpRequest::from_core(pending.request),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a document-deletion request. `timeout_ms` of 0 means no explicit
/// timeout is forwarded to the transport.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_build_delete_document(
    client: *const FfiCortexClient,
    project_id: *const c_char,
    collection_id: *const c_char,
    document_id: *const c_char,
    timeout_ms: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null()
            || project_id.is_null()
            || collection_id.is_null()
            || document_id.is_null()
        {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let timeout = if timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(timeout_ms))
        };
        match client.inner.build_delete_document(
            &c_str(project_id),
            &c_str(collection_id),
            &c_str(document_id),
            timeout,
        ) {
            Ok(pending) => FfiHttpRequest::from_core(pending.request),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body
/// pointer is treated as an empty body.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        c_str(resp.body)
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse a list-collections response.
///
/// Returns a result with `data_tag = CollectionList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_parse_list_collections(
    client: *const FfiCortexClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCortexResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCortexResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCortexResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_list_collections(ffi_response_to_core(resp)) {
            Ok(list) => FfiCortexResult::ok_collections(list.collections),
            Err(e) => FfiCortexResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCortexResult::panic("panic in cortex_parse_list_collections"))
}

/// Parse a query response.
///
/// Returns a result with `data_tag = Json` on success: the matched
/// documents re-serialized as a JSON C string, since their shape depends
/// on the collection schema.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_parse_query(
    client: *const FfiCortexClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCortexResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCortexResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCortexResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_query(ffi_response_to_core(resp)) {
            Ok(results) => FfiCortexResult::ok_query(&results),
            Err(e) => FfiCortexResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCortexResult::panic("panic in cortex_parse_query"))
}

/// Parse an add-document response (expects HTTP 202).
///
/// Returns a result with `data_tag = Document` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_parse_add_document(
    client: *const FfiCortexClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCortexResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCortexResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCortexResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_add_document(ffi_response_to_core(resp)) {
            Ok(receipt) => FfiCortexResult::ok_accepted(receipt),
            Err(e) => FfiCortexResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCortexResult::panic("panic in cortex_parse_add_document"))
}

/// Parse a delete-document response.
///
/// Returns a result with `data_tag = Document` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_parse_delete_document(
    client: *const FfiCortexClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCortexResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCortexResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCortexResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client
            .inner
            .parse_delete_document(ffi_response_to_core(resp))
        {
            Ok(receipt) => FfiCortexResult::ok_deleted(receipt),
            Err(e) => FfiCortexResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCortexResult::panic("panic in cortex_parse_delete_document"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `cortex_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.json_body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Vec::from_raw_parts(req.headers, req.headers_len as usize, req.headers_len as usize)
            };
            for h in headers {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
        if !req.form_parts.is_null() && req.form_parts_len > 0 {
            let parts = unsafe {
                Vec::from_raw_parts(
                    req.form_parts,
                    req.form_parts_len as usize,
                    req.form_parts_len as usize,
                )
            };
            for part in parts {
                free_c_string(part.name);
                free_c_string(part.text);
                free_c_string(part.filename);
                free_c_string(part.content_type);
                if !part.data.is_null() && part.data_len > 0 {
                    drop(unsafe {
                        Vec::from_raw_parts(
                            part.data,
                            part.data_len as usize,
                            part.data_len as usize,
                        )
                    });
                }
            }
        }
    });
}

/// Free the C-string fields of an `FfiCollection` (but not the struct
/// itself).
fn free_ffi_collection_fields(collection: &FfiCollection) {
    free_c_string(collection.collection_id);
    free_c_string(collection.name);
    free_c_string(collection.created);
}

/// Free an `FfiCortexResult` returned by any `cortex_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data`
/// points to.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_free_result(result: *mut FfiCortexResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::CollectionList => {
                    let list = unsafe { Box::from_raw(result.data as *mut FfiCollectionList) };
                    if !list.items.is_null() && list.len > 0 {
                        let items = unsafe {
                            Vec::from_raw_parts(list.items, list.len as usize, list.len as usize)
                        };
                        for item in &items {
                            free_ffi_collection_fields(item);
                        }
                    }
                }
                FfiDataTag::Document => {
                    let receipt = unsafe { Box::from_raw(result.data as *mut FfiDocumentReceipt) };
                    free_c_string(receipt.document_id);
                    free_c_string(receipt.status);
                }
                FfiDataTag::Json => {
                    free_c_string(result.data as *mut c_char);
                }
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cortex_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            free_c_string(s);
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client() -> *mut FfiCortexClient {
        let base_url = CString::new("http://localhost:3000").unwrap();
        let version = CString::new("2023-03-31").unwrap();
        let token = CString::new("test-token").unwrap();
        cortex_client_new(base_url.as_ptr(), version.as_ptr(), token.as_ptr())
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        cortex_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = cortex_client_new(std::ptr::null(), std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        cortex_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_list_collections_returns_correct_request() {
        let client = new_client();
        let project_id = CString::new("p1").unwrap();
        let req = cortex_build_list_collections(client, project_id.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        let url = unsafe { CStr::from_ptr(req_ref.url) }.to_str().unwrap();
        assert_eq!(
            url,
            "http://localhost:3000/v2/projects/p1/collections?version=2023-03-31"
        );
        assert_eq!(req_ref.headers_len, 1);
        assert!(req_ref.body_tag == FfiBodyTag::None);

        cortex_free_request(req);
        cortex_client_free(client);
    }

    #[test]
    fn build_list_collections_empty_project_returns_null() {
        let client = new_client();
        let project_id = CString::new("").unwrap();
        let req = cortex_build_list_collections(client, project_id.as_ptr());
        assert!(req.is_null());
        cortex_client_free(client);
    }

    #[test]
    fn build_query_produces_json_body() {
        let client = new_client();
        let project_id = CString::new("p1").unwrap();
        let nlq = CString::new("test").unwrap();
        let req = cortex_build_query(client, project_id.as_ptr(), nlq.as_ptr(), std::ptr::null(), -1);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert!(req_ref.body_tag == FfiBodyTag::Json);
        let body = unsafe { CStr::from_ptr(req_ref.json_body) }.to_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body, serde_json::json!({"natural_language_query": "test"}));

        cortex_free_request(req);
        cortex_client_free(client);
    }

    #[test]
    fn build_query_with_both_modes_returns_null() {
        let client = new_client();
        let project_id = CString::new("p1").unwrap();
        let nlq = CString::new("a").unwrap();
        let query = CString::new("b").unwrap();
        let req = cortex_build_query(client, project_id.as_ptr(), nlq.as_ptr(), query.as_ptr(), -1);
        assert!(req.is_null());
        cortex_client_free(client);
    }

    #[test]
    fn build_add_document_produces_form_parts() {
        let client = new_client();
        let project_id = CString::new("p1").unwrap();
        let collection_id = CString::new("c1").unwrap();
        let filename = CString::new("doc.txt").unwrap();
        let content_type = CString::new("text/plain").unwrap();
        let file = b"hello";
        let req = cortex_build_add_document(
            client,
            project_id.as_ptr(),
            collection_id.as_ptr(),
            file.as_ptr(),
            file.len() as u32,
            filename.as_ptr(),
            content_type.as_ptr(),
            std::ptr::null(),
        );
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(req_ref.body_tag == FfiBodyTag::Form);
        assert_eq!(req_ref.form_parts_len, 1);
        let part = unsafe { &*req_ref.form_parts };
        assert!(part.is_file);
        let name = unsafe { CStr::from_ptr(part.name) }.to_str().unwrap();
        assert_eq!(name, "file");
        let data = unsafe { std::slice::from_raw_parts(part.data, part.data_len as usize) };
        assert_eq!(data, b"hello");

        cortex_free_request(req);
        cortex_client_free(client);
    }

    #[test]
    fn parse_list_collections_success() {
        let client = new_client();
        let body = CString::new(
            r#"{"collections":[{"collection_id":"c1","name":"docs","created":"2026-01-05T08:30:00+00:00"}]}"#,
        )
        .unwrap();
        let response = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = cortex_parse_list_collections(client, &response);
        assert!(!result.is_null());

        let result_ref = unsafe { &*result };
        assert!(matches!(result_ref.error_code, FfiErrorCode::Ok));
        let list = unsafe { &*(result_ref.data as *const FfiCollectionList) };
        assert_eq!(list.len, 1);
        let item = unsafe { &*list.items };
        let id = unsafe { CStr::from_ptr(item.collection_id) }.to_str().unwrap();
        assert_eq!(id, "c1");

        cortex_free_result(result);
        cortex_client_free(client);
    }

    #[test]
    fn parse_list_collections_null_response_is_null_arg() {
        let client = new_client();
        let result = cortex_parse_list_collections(client, std::ptr::null());
        let result_ref = unsafe { &*result };
        assert!(matches!(result_ref.error_code, FfiErrorCode::NullArg));
        cortex_free_result(result);
        cortex_client_free(client);
    }

    #[test]
    fn parse_add_document_maps_404() {
        let client = new_client();
        let body = CString::new("").unwrap();
        let response = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = cortex_parse_add_document(client, &response);
        let result_ref = unsafe { &*result };
        assert!(matches!(result_ref.error_code, FfiErrorCode::NotFound));
        assert_eq!(result_ref.http_status, 404);
        cortex_free_result(result);
        cortex_client_free(client);
    }

    #[test]
    fn parse_query_returns_json_payload() {
        let client = new_client();
        let body =
            CString::new(r#"{"matching_results":1,"results":[{"document_id":"d1"}]}"#).unwrap();
        let response = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = cortex_parse_query(client, &response);
        let result_ref = unsafe { &*result };
        assert!(matches!(result_ref.error_code, FfiErrorCode::Ok));
        assert!(matches!(result_ref.data_tag, FfiDataTag::Json));
        let raw = unsafe { CStr::from_ptr(result_ref.data as *const c_char) }
            .to_str()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["matching_results"], 1);

        cortex_free_result(result);
        cortex_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        cortex_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        cortex_free_result(std::ptr::null_mut());
    }
}
