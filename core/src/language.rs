//! Client for the legacy form-encoded language service family.
//!
//! # Design
//! The legacy convention differs from the discovery family in three ways,
//! all kept local to this module: authentication is an `apikey` query
//! parameter, bodies are flat form fields rather than JSON, and the path
//! depends on the kind of source being analyzed (`/text/TextGet...` vs
//! `/url/URLGet...`). [`Source`] makes the one-of text/url input a
//! type-level choice instead of a pair of optional arguments. Responses
//! report service-level rejection in-band: a 200 whose body says
//! `"status": "ERROR"` parses into [`ApiError::ServiceError`], never into
//! a success.

use crate::endpoint::{require, Endpoint};
use crate::envelope::Pending;
use crate::error::ApiError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::types::{CombinedResult, EntitiesResult, KeywordsResult, SentimentResult};

/// An operation that exists once per source kind.
struct SourcedEndpoint {
    text: Endpoint,
    url: Endpoint,
}

impl SourcedEndpoint {
    const fn new(text_call: &'static str, url_call: &'static str) -> Self {
        Self {
            text: Endpoint::new(HttpMethod::Post, text_call),
            url: Endpoint::new(HttpMethod::Post, url_call),
        }
    }

    fn for_source(&self, source: &Source) -> &Endpoint {
        match source {
            Source::Text(_) => &self.text,
            Source::Url(_) => &self.url,
        }
    }
}

const EXTRACT_ENTITIES: SourcedEndpoint = SourcedEndpoint::new(
    "/text/TextGetRankedNamedEntities",
    "/url/URLGetRankedNamedEntities",
);
const ANALYZE_SENTIMENT: SourcedEndpoint =
    SourcedEndpoint::new("/text/TextGetTextSentiment", "/url/URLGetTextSentiment");
const EXTRACT_KEYWORDS: SourcedEndpoint =
    SourcedEndpoint::new("/text/TextGetRankedKeywords", "/url/URLGetRankedKeywords");
const COMBINED_INSIGHTS: SourcedEndpoint =
    SourcedEndpoint::new("/text/TextGetCombinedData", "/url/URLGetCombinedData");

/// The content to analyze: raw text or a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    Url(String),
}

impl Source {
    pub fn text(value: &str) -> Self {
        Source::Text(value.to_string())
    }

    pub fn url(value: &str) -> Self {
        Source::Url(value.to_string())
    }

    /// Form field name and value carrying this source.
    fn field(&self) -> (&'static str, &str) {
        match self {
            Source::Text(value) => ("text", value),
            Source::Url(value) => ("url", value),
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        let (name, value) = self.field();
        require(name, value)
    }
}

/// Options for entity extraction. Unset fields are omitted from the form.
#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    pub max_retrieve: Option<u32>,
    pub sentiment: Option<bool>,
    pub show_source_text: Option<bool>,
}

/// Options for keyword extraction.
#[derive(Debug, Clone, Default)]
pub struct KeywordOptions {
    pub max_retrieve: Option<u32>,
    pub sentiment: Option<bool>,
}

/// Configuration for a [`LanguageClient`], fixed at construction. There is
/// no shared key state; each client owns its key.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub base_url: String,
    pub api_key: String,
}

impl LanguageConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

/// Stateless build/parse client for the legacy language family.
#[derive(Debug, Clone)]
pub struct LanguageClient {
    config: LanguageConfig,
}

impl LanguageClient {
    pub fn new(config: LanguageConfig) -> Self {
        Self { config }
    }

    /// Build the common request shape: source-dependent path, `apikey` and
    /// `outputMode` query parameters, source value as the first form field.
    fn request(
        &self,
        endpoint: &SourcedEndpoint,
        source: &Source,
    ) -> Result<(HttpRequest, Vec<FormPart>), ApiError> {
        source.validate()?;
        let endpoint = endpoint.for_source(source);
        let url = endpoint.expand(&self.config.base_url, &[])?;
        let mut request = HttpRequest::new(endpoint.method.clone(), url);
        request
            .query
            .push(("apikey".to_string(), self.config.api_key.clone()));
        request
            .query
            .push(("outputMode".to_string(), "json".to_string()));
        let (name, value) = source.field();
        let parts = vec![FormPart::text(name, value)];
        Ok((request, parts))
    }

    fn flag(parts: &mut Vec<FormPart>, name: &str, value: Option<bool>) {
        if let Some(value) = value {
            parts.push(FormPart::text(name, if value { "1" } else { "0" }));
        }
    }

    fn number(parts: &mut Vec<FormPart>, name: &str, value: Option<u32>) {
        if let Some(value) = value {
            parts.push(FormPart::text(name, &value.to_string()));
        }
    }

    pub fn build_extract_entities(
        &self,
        source: &Source,
        options: &EntityOptions,
    ) -> Result<Pending<EntitiesResult>, ApiError> {
        let (mut request, mut parts) = self.request(&EXTRACT_ENTITIES, source)?;
        Self::number(&mut parts, "maxRetrieve", options.max_retrieve);
        Self::flag(&mut parts, "sentiment", options.sentiment);
        Self::flag(&mut parts, "showSourceText", options.show_source_text);
        request.body = Some(RequestBody::Form(parts));
        Ok(Pending::new(request, parse::entities))
    }

    pub fn build_analyze_sentiment(
        &self,
        source: &Source,
    ) -> Result<Pending<SentimentResult>, ApiError> {
        let (mut request, parts) = self.request(&ANALYZE_SENTIMENT, source)?;
        request.body = Some(RequestBody::Form(parts));
        Ok(Pending::new(request, parse::sentiment))
    }

    pub fn build_extract_keywords(
        &self,
        source: &Source,
        options: &KeywordOptions,
    ) -> Result<Pending<KeywordsResult>, ApiError> {
        let (mut request, mut parts) = self.request(&EXTRACT_KEYWORDS, source)?;
        Self::number(&mut parts, "maxRetrieve", options.max_retrieve);
        Self::flag(&mut parts, "sentiment", options.sentiment);
        request.body = Some(RequestBody::Form(parts));
        Ok(Pending::new(request, parse::keywords))
    }

    /// One round-trip requesting several analyses. `features` become the
    /// comma-joined `extract` field; an empty list is a caller error.
    pub fn build_combined_insights(
        &self,
        source: &Source,
        features: &[&str],
    ) -> Result<Pending<CombinedResult>, ApiError> {
        if features.is_empty() {
            return Err(ApiError::ConflictingParameters(
                "combined call requires at least one feature",
            ));
        }
        let (mut request, mut parts) = self.request(&COMBINED_INSIGHTS, source)?;
        parts.push(FormPart::text("extract", &features.join(",")));
        request.body = Some(RequestBody::Form(parts));
        Ok(Pending::new(request, parse::combined))
    }

    pub fn parse_extract_entities(
        &self,
        response: HttpResponse,
    ) -> Result<EntitiesResult, ApiError> {
        parse::entities(&response)
    }

    pub fn parse_analyze_sentiment(
        &self,
        response: HttpResponse,
    ) -> Result<SentimentResult, ApiError> {
        parse::sentiment(&response)
    }

    pub fn parse_extract_keywords(
        &self,
        response: HttpResponse,
    ) -> Result<KeywordsResult, ApiError> {
        parse::keywords(&response)
    }

    pub fn parse_combined_insights(
        &self,
        response: HttpResponse,
    ) -> Result<CombinedResult, ApiError> {
        parse::combined(&response)
    }
}

/// Per-operation parsers. Decoding succeeds at the JSON level first, then
/// the in-band status field decides between success and service rejection.
mod parse {
    use super::*;
    use crate::envelope::decode_json;

    fn service_status(
        status: &Option<String>,
        status_info: &Option<String>,
    ) -> Result<(), ApiError> {
        match status.as_deref() {
            Some("ERROR") => Err(ApiError::ServiceError(
                status_info
                    .clone()
                    .unwrap_or_else(|| "no statusInfo provided".to_string()),
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn entities(response: &HttpResponse) -> Result<EntitiesResult, ApiError> {
        let result: EntitiesResult = decode_json(response, 200)?;
        service_status(&result.status, &result.status_info)?;
        Ok(result)
    }

    pub(super) fn sentiment(response: &HttpResponse) -> Result<SentimentResult, ApiError> {
        let result: SentimentResult = decode_json(response, 200)?;
        service_status(&result.status, &result.status_info)?;
        Ok(result)
    }

    pub(super) fn keywords(response: &HttpResponse) -> Result<KeywordsResult, ApiError> {
        let result: KeywordsResult = decode_json(response, 200)?;
        service_status(&result.status, &result.status_info)?;
        Ok(result)
    }

    pub(super) fn combined(response: &HttpResponse) -> Result<CombinedResult, ApiError> {
        let result: CombinedResult = decode_json(response, 200)?;
        service_status(&result.status, &result.status_info)?;
        Ok(result)
    }
}
