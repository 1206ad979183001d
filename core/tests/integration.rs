//! Full discovery lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the core client
//! over real HTTP using a ureq-backed [`Connector`]. Validates request
//! building, multipart encoding, response parsing, and the dispatcher's
//! callback contract end-to-end.

use std::cell::RefCell;
use std::time::Duration;

use cortex_core::{
    ApiError, Connector, CreateCollection, Credentials, DiscoveryClient, DiscoveryConfig,
    Dispatcher, DocumentInput, FormValue, HttpMethod, HttpRequest, HttpResponse, QueryParams,
    RequestBody, TransportError,
};
use serde_json::json;

const BOUNDARY: &str = "cortex-test-boundary";
const VERSION: &str = "2023-03-31";

/// Render structured form parts as a multipart/form-data payload.
fn encode_multipart(parts: &[cortex_core::FormPart]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match &part.value {
            FormValue::Text(value) => {
                out.extend_from_slice(
                    format!(
                        "content-disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(value.as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            FormValue::File {
                data,
                filename,
                content_type,
            } => {
                out.extend_from_slice(
                    format!(
                        "content-disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\ncontent-type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(data);
                out.extend_from_slice(b"\r\n");
            }
        }
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

/// Execute requests with ureq. Disables ureq's status-code-as-error
/// behavior so 4xx/5xx responses come back as data and the core client
/// handles status interpretation.
struct UreqConnector {
    agent: ureq::Agent,
}

impl UreqConnector {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Connector for UreqConnector {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.full_url();

        let result = match &request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&url);
                for (key, value) in &request.headers {
                    builder = builder.header(key, value);
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&url);
                for (key, value) in &request.headers {
                    builder = builder.header(key, value);
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = match request.method {
                    HttpMethod::Put => self.agent.put(&url),
                    _ => self.agent.post(&url),
                };
                for (key, value) in &request.headers {
                    builder = builder.header(key, value);
                }
                match &request.body {
                    Some(RequestBody::Json(raw)) => builder.send(raw.as_bytes()),
                    Some(RequestBody::Form(parts)) => builder
                        .content_type(format!("multipart/form-data; boundary={BOUNDARY}"))
                        .send(&encode_multipart(parts)[..]),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn discovery_lifecycle() {
    let base_url = start_server();
    let client = DiscoveryClient::new(DiscoveryConfig::new(
        &base_url,
        VERSION,
        Credentials::BearerToken("test-token".to_string()),
    ));
    let connector = UreqConnector::new();
    let dispatcher = Dispatcher::new(UreqConnector::new());

    // Step 1: list collections through the dispatcher — empty store, and
    // the correlation token must come back unchanged.
    let fired = RefCell::new(0u32);
    let pending = client
        .build_list_collections("p1")
        .unwrap()
        .with_custom(json!({"call": "initial-list"}));
    let accepted = dispatcher.dispatch(pending, |parsed| {
        *fired.borrow_mut() += 1;
        assert!(parsed.success, "list failed: {:?}", parsed.error);
        assert_eq!(parsed.status, 200);
        assert_eq!(parsed.custom, Some(json!({"call": "initial-list"})));
        assert!(parsed.result.unwrap().collections.is_empty());
    });
    assert!(accepted);
    assert_eq!(*fired.borrow(), 1);

    // Step 2: create a collection.
    let pending = client
        .build_create_collection("p1", &CreateCollection::new("reports"))
        .unwrap();
    let response = connector.send(&pending.request).unwrap();
    let collection = client.parse_create_collection(response).unwrap();
    assert_eq!(collection.name, "reports");
    let collection_id = collection.collection_id.clone();

    // Step 3: ingest a document with metadata.
    let input = DocumentInput {
        file: b"quarterly revenue grew steadily".to_vec(),
        filename: "q3.txt".to_string(),
        content_type: "text/plain".to_string(),
        metadata: Some(r#"{"source":"integration"}"#.to_string()),
    };
    let pending = client
        .build_add_document("p1", &collection_id, &input)
        .unwrap();
    let response = connector.send(&pending.request).unwrap();
    let receipt = client.parse_add_document(response).unwrap();
    let document_id = receipt.document_id.unwrap();
    assert_eq!(receipt.status.as_deref(), Some("processing"));

    // Step 4: query finds the ingested document.
    let params = QueryParams {
        natural_language_query: Some("revenue".to_string()),
        ..Default::default()
    };
    let pending = client.build_query("p1", &params).unwrap();
    let response = connector.send(&pending.request).unwrap();
    let results = client.parse_query(response).unwrap();
    assert_eq!(results.matching_results, Some(1));
    assert_eq!(
        results.results[0].document_id.as_deref(),
        Some(document_id.as_str())
    );

    // Step 5: delete the document, forwarding an explicit timeout.
    let pending = client
        .build_delete_document(
            "p1",
            &collection_id,
            &document_id,
            Some(Duration::from_secs(90)),
        )
        .unwrap();
    let response = connector.send(&pending.request).unwrap();
    let deleted = client.parse_delete_document(response).unwrap();
    assert_eq!(deleted.status.as_deref(), Some("deleted"));

    // Step 6: deleting again is a NotFound, delivered through the
    // dispatcher as a failure-flagged response rather than a panic.
    let pending = client
        .build_delete_document("p1", &collection_id, &document_id, None)
        .unwrap()
        .with_custom(json!("second-delete"));
    let accepted = dispatcher.dispatch(pending, |parsed| {
        assert!(!parsed.success);
        assert_eq!(parsed.status, 404);
        assert!(matches!(parsed.error, Some(ApiError::NotFound)));
        assert_eq!(parsed.custom, Some(json!("second-delete")));
    });
    assert!(accepted);

    // Step 7: drop the collection.
    let pending = client
        .build_delete_collection("p1", &collection_id, Some(Duration::from_secs(90)))
        .unwrap();
    let response = connector.send(&pending.request).unwrap();
    client.parse_delete_collection(response).unwrap();
}

#[test]
fn rejected_credentials_surface_as_unauthorized() {
    let base_url = start_server();
    // ApiKey credentials put the key in the query string; the discovery
    // gateway wants a bearer header and answers 401.
    let client = DiscoveryClient::new(DiscoveryConfig::new(
        &base_url,
        VERSION,
        Credentials::ApiKey("legacy-key".to_string()),
    ));
    let connector = UreqConnector::new();

    let pending = client.build_list_collections("p1").unwrap();
    let response = connector.send(&pending.request).unwrap();
    let err = client.parse_list_collections(response).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[test]
fn unknown_route_parses_as_not_found() {
    let base_url = start_server();
    let client = DiscoveryClient::new(DiscoveryConfig::new(
        &base_url,
        VERSION,
        Credentials::BearerToken("test-token".to_string()),
    ));
    let connector = UreqConnector::new();

    // The mock does not implement autocompletion; the 404 (with an empty,
    // unparseable body) must come back as NotFound, not a panic.
    let pending = client
        .build_autocompletion("p1", "rev", None, Some(5))
        .unwrap();
    let response = connector.send(&pending.request).unwrap();
    let err = client.parse_autocompletion(response).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}
