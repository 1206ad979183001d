//! Typed request/response client core for two cognitive REST service
//! families.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The embedding application
//! executes the actual round-trip — directly, or through a [`Connector`]
//! driven by [`Dispatcher`] — making the core fully deterministic and
//! testable.
//!
//! # Design
//! - Clients are stateless: each holds only its config (base URL, version
//!   or API key, credentials), passed at construction.
//! - Each operation is split into `build_*` (produces a typed [`Pending`]
//!   request) and `parse_*` (consumes a response), so the I/O boundary is
//!   explicit.
//! - Operations are described by data-driven [`Endpoint`] descriptors;
//!   one expansion routine handles path parameters for both families.
//! - A [`Pending`] carries an opaque correlation token that comes back
//!   unchanged on the [`ParsedResponse`], success or failure.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod auth;
pub mod discovery;
pub mod dispatch;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod language;
pub mod types;

pub use auth::Credentials;
pub use discovery::{DiscoveryClient, DiscoveryConfig};
pub use dispatch::{Connector, Dispatcher, TransportError};
pub use endpoint::Endpoint;
pub use envelope::{ParsedResponse, Pending};
pub use error::ApiError;
pub use http::{FormPart, FormValue, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use language::{
    EntityOptions, KeywordOptions, LanguageClient, LanguageConfig, Source,
};
pub use types::{
    Collection, CollectionList, CombinedResult, Completions, CreateCollection,
    DeleteDocumentResponse, DocumentAccepted, DocumentInput, EntitiesResult, Entity, Keyword,
    KeywordsResult, Project, ProjectList, QueryParams, QueryResponse, QueryResult, Sentiment,
    SentimentResult,
};
