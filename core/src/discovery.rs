//! Client for the JSON-bodied discovery service family.
//!
//! # Design
//! `DiscoveryClient` is stateless: it holds only its [`DiscoveryConfig`]
//! and carries nothing between calls. Each operation is split into a
//! `build_*` method producing a typed [`Pending`] request and a `parse_*`
//! method consuming an [`HttpResponse`]; the caller (or a
//! [`crate::Dispatcher`]) executes the round-trip in between. Every request
//! carries the configured `version` query parameter and the client's
//! credentials. Optional body fields follow omit-if-absent: an unset field
//! never appears in the JSON.

use std::time::Duration;

use crate::auth::Credentials;
use crate::endpoint::{require, Endpoint};
use crate::envelope::Pending;
use crate::error::ApiError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::types::{
    Collection, CollectionList, Completions, CreateCollection, DeleteDocumentResponse,
    DocumentAccepted, DocumentInput, ProjectList, QueryParams, QueryResponse,
};

const LIST_PROJECTS: Endpoint = Endpoint::new(HttpMethod::Get, "/v2/projects");
const LIST_COLLECTIONS: Endpoint =
    Endpoint::new(HttpMethod::Get, "/v2/projects/{project_id}/collections");
const CREATE_COLLECTION: Endpoint =
    Endpoint::new(HttpMethod::Post, "/v2/projects/{project_id}/collections");
const DELETE_COLLECTION: Endpoint = Endpoint::new(
    HttpMethod::Delete,
    "/v2/projects/{project_id}/collections/{collection_id}",
);
const QUERY: Endpoint = Endpoint::new(HttpMethod::Post, "/v2/projects/{project_id}/query");
const AUTOCOMPLETION: Endpoint =
    Endpoint::new(HttpMethod::Get, "/v2/projects/{project_id}/autocompletion");
const ADD_DOCUMENT: Endpoint = Endpoint::new(
    HttpMethod::Post,
    "/v2/projects/{project_id}/collections/{collection_id}/documents",
);
const UPDATE_DOCUMENT: Endpoint = Endpoint::new(
    HttpMethod::Post,
    "/v2/projects/{project_id}/collections/{collection_id}/documents/{document_id}",
);
const DELETE_DOCUMENT: Endpoint = Endpoint::new(
    HttpMethod::Delete,
    "/v2/projects/{project_id}/collections/{collection_id}/documents/{document_id}",
);

/// Configuration for a [`DiscoveryClient`], fixed at construction.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub base_url: String,
    /// Version date sent as the `version` query parameter on every call.
    pub version: String,
    pub credentials: Credentials,
}

impl DiscoveryConfig {
    pub fn new(base_url: &str, version: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
            credentials,
        }
    }
}

/// Stateless build/parse client for the discovery family.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    config: DiscoveryConfig,
}

impl DiscoveryClient {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Expand an endpoint and attach the version parameter and credentials.
    fn request(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let url = endpoint.expand(&self.config.base_url, params)?;
        let mut request = HttpRequest::new(endpoint.method.clone(), url);
        request
            .query
            .push(("version".to_string(), self.config.version.clone()));
        self.config.credentials.apply(&mut request);
        Ok(request)
    }

    fn json_body<B: serde::Serialize>(
        request: &mut HttpRequest,
        body: &B,
    ) -> Result<(), ApiError> {
        let raw = serde_json::to_string(body)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(RequestBody::Json(raw));
        Ok(())
    }

    fn document_form(input: &DocumentInput) -> Result<Vec<FormPart>, ApiError> {
        if input.file.is_empty() {
            return Err(ApiError::MissingParameter("file"));
        }
        require("filename", &input.filename)?;
        require("content_type", &input.content_type)?;
        let mut parts = vec![FormPart::file(
            "file",
            input.file.clone(),
            &input.filename,
            &input.content_type,
        )];
        if let Some(metadata) = &input.metadata {
            parts.push(FormPart::text("metadata", metadata));
        }
        Ok(parts)
    }

    // -----------------------------------------------------------------------
    // Projects and collections
    // -----------------------------------------------------------------------

    pub fn build_list_projects(&self) -> Result<Pending<ProjectList>, ApiError> {
        let request = self.request(&LIST_PROJECTS, &[])?;
        Ok(Pending::new(request, parse::project_list))
    }

    pub fn build_list_collections(
        &self,
        project_id: &str,
    ) -> Result<Pending<CollectionList>, ApiError> {
        let request = self.request(&LIST_COLLECTIONS, &[("project_id", project_id)])?;
        Ok(Pending::new(request, parse::collection_list))
    }

    pub fn build_create_collection(
        &self,
        project_id: &str,
        input: &CreateCollection,
    ) -> Result<Pending<Collection>, ApiError> {
        require("name", &input.name)?;
        let mut request = self.request(&CREATE_COLLECTION, &[("project_id", project_id)])?;
        Self::json_body(&mut request, input)?;
        Ok(Pending::new(request, parse::collection))
    }

    /// `timeout` is forwarded to the transport; deletion of a large
    /// collection can outlast default limits.
    pub fn build_delete_collection(
        &self,
        project_id: &str,
        collection_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Pending<()>, ApiError> {
        let mut request = self.request(
            &DELETE_COLLECTION,
            &[("project_id", project_id), ("collection_id", collection_id)],
        )?;
        request.timeout = timeout;
        Ok(Pending::new(request, parse::deleted))
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Build a project query. `natural_language_query` and `query` are
    /// mutually exclusive; supplying neither queries everything.
    pub fn build_query(
        &self,
        project_id: &str,
        params: &QueryParams,
    ) -> Result<Pending<QueryResponse>, ApiError> {
        if params.natural_language_query.is_some() && params.query.is_some() {
            return Err(ApiError::ConflictingParameters(
                "natural_language_query, query",
            ));
        }
        let mut request = self.request(&QUERY, &[("project_id", project_id)])?;
        Self::json_body(&mut request, params)?;
        Ok(Pending::new(request, parse::query))
    }

    pub fn build_autocompletion(
        &self,
        project_id: &str,
        prefix: &str,
        field: Option<&str>,
        count: Option<u32>,
    ) -> Result<Pending<Completions>, ApiError> {
        require("prefix", prefix)?;
        let mut request = self.request(&AUTOCOMPLETION, &[("project_id", project_id)])?;
        request
            .query
            .push(("prefix".to_string(), prefix.to_string()));
        if let Some(field) = field {
            request.query.push(("field".to_string(), field.to_string()));
        }
        if let Some(count) = count {
            request.query.push(("count".to_string(), count.to_string()));
        }
        Ok(Pending::new(request, parse::completions))
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn build_add_document(
        &self,
        project_id: &str,
        collection_id: &str,
        input: &DocumentInput,
    ) -> Result<Pending<DocumentAccepted>, ApiError> {
        let mut request = self.request(
            &ADD_DOCUMENT,
            &[("project_id", project_id), ("collection_id", collection_id)],
        )?;
        request.body = Some(RequestBody::Form(Self::document_form(input)?));
        Ok(Pending::new(request, parse::document_accepted))
    }

    pub fn build_update_document(
        &self,
        project_id: &str,
        collection_id: &str,
        document_id: &str,
        input: &DocumentInput,
    ) -> Result<Pending<DocumentAccepted>, ApiError> {
        let mut request = self.request(
            &UPDATE_DOCUMENT,
            &[
                ("project_id", project_id),
                ("collection_id", collection_id),
                ("document_id", document_id),
            ],
        )?;
        request.body = Some(RequestBody::Form(Self::document_form(input)?));
        Ok(Pending::new(request, parse::document_accepted))
    }

    /// `timeout` is forwarded to the transport, as for collection deletion.
    pub fn build_delete_document(
        &self,
        project_id: &str,
        collection_id: &str,
        document_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Pending<DeleteDocumentResponse>, ApiError> {
        let mut request = self.request(
            &DELETE_DOCUMENT,
            &[
                ("project_id", project_id),
                ("collection_id", collection_id),
                ("document_id", document_id),
            ],
        )?;
        request.timeout = timeout;
        Ok(Pending::new(request, parse::document_deleted))
    }

    // -----------------------------------------------------------------------
    // Parse methods
    // -----------------------------------------------------------------------

    pub fn parse_list_projects(&self, response: HttpResponse) -> Result<ProjectList, ApiError> {
        parse::project_list(&response)
    }

    pub fn parse_list_collections(
        &self,
        response: HttpResponse,
    ) -> Result<CollectionList, ApiError> {
        parse::collection_list(&response)
    }

    pub fn parse_create_collection(&self, response: HttpResponse) -> Result<Collection, ApiError> {
        parse::collection(&response)
    }

    pub fn parse_delete_collection(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse::deleted(&response)
    }

    pub fn parse_query(&self, response: HttpResponse) -> Result<QueryResponse, ApiError> {
        parse::query(&response)
    }

    pub fn parse_autocompletion(&self, response: HttpResponse) -> Result<Completions, ApiError> {
        parse::completions(&response)
    }

    pub fn parse_add_document(&self, response: HttpResponse) -> Result<DocumentAccepted, ApiError> {
        parse::document_accepted(&response)
    }

    pub fn parse_update_document(
        &self,
        response: HttpResponse,
    ) -> Result<DocumentAccepted, ApiError> {
        parse::document_accepted(&response)
    }

    pub fn parse_delete_document(
        &self,
        response: HttpResponse,
    ) -> Result<DeleteDocumentResponse, ApiError> {
        parse::document_deleted(&response)
    }
}

/// Per-operation response parsers, shared between the `parse_*` methods
/// and the [`Pending`] envelopes built alongside each request.
mod parse {
    use super::*;
    use crate::envelope::{check_status, decode_json};

    pub(super) fn project_list(response: &HttpResponse) -> Result<ProjectList, ApiError> {
        decode_json(response, 200)
    }

    pub(super) fn collection_list(response: &HttpResponse) -> Result<CollectionList, ApiError> {
        decode_json(response, 200)
    }

    pub(super) fn collection(response: &HttpResponse) -> Result<Collection, ApiError> {
        decode_json(response, 201)
    }

    pub(super) fn deleted(response: &HttpResponse) -> Result<(), ApiError> {
        check_status(response, 200)
    }

    pub(super) fn query(response: &HttpResponse) -> Result<QueryResponse, ApiError> {
        decode_json(response, 200)
    }

    pub(super) fn completions(response: &HttpResponse) -> Result<Completions, ApiError> {
        decode_json(response, 200)
    }

    pub(super) fn document_accepted(response: &HttpResponse) -> Result<DocumentAccepted, ApiError> {
        decode_json(response, 202)
    }

    pub(super) fn document_deleted(
        response: &HttpResponse,
    ) -> Result<DeleteDocumentResponse, ApiError> {
        decode_json(response, 200)
    }
}
