//! Result and payload records for both service families.
//!
//! # Design
//! Every response record is a plain data struct, immutable after
//! deserialization, with at most convenience accessors (e.g. parsing a raw
//! timestamp string on demand). Optional request fields carry
//! `skip_serializing_if` so an unset field is omitted from the body
//! entirely, never emitted as an explicit null. Legacy-family JSON uses
//! camelCase keys and string-typed numbers as received; records keep the
//! raw strings.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Discovery family
// ---------------------------------------------------------------------------

/// A project grouping collections of ingested documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A collection of ingested documents within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub collection_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Creation timestamp exactly as the service sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl Collection {
    /// Parse the raw `created` string on demand. Returns `None` when the
    /// field is absent or not valid RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// Payload for creating a collection. Only `name` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CreateCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            language: None,
        }
    }
}

/// Body of a project query. Unset fields are omitted from the JSON.
///
/// `natural_language_query` and `query` are mutually exclusive; the client
/// rejects a body carrying both before anything is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_language_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spelling_suggestions: Option<bool>,
}

/// A single matched document. Fields beyond the id vary per collection
/// schema and are kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_results: Option<u64>,
    #[serde(default)]
    pub results: Vec<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
}

/// Query-completion suggestions for a partial entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completions {
    #[serde(default)]
    pub completions: Vec<String>,
}

/// Input for document ingestion: raw file content plus an optional
/// metadata JSON string attached as its own form field.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub file: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub metadata: Option<String>,
}

/// Receipt for an accepted (not yet processed) document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentAccepted {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteDocumentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Language family
// ---------------------------------------------------------------------------

/// Sentiment block attached to documents, entities and keywords.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sentiment {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sentiment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed: Option<String>,
}

/// A ranked named entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitiesResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusInfo", skip_serializing_if = "Option::is_none")]
    pub status_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// A ranked keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusInfo", skip_serializing_if = "Option::is_none")]
    pub status_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusInfo", skip_serializing_if = "Option::is_none")]
    pub status_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "docSentiment", skip_serializing_if = "Option::is_none")]
    pub doc_sentiment: Option<Sentiment>,
}

/// Result of a combined call requesting several analyses at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusInfo", skip_serializing_if = "Option::is_none")]
    pub status_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(rename = "docSentiment", skip_serializing_if = "Option::is_none")]
    pub doc_sentiment: Option<Sentiment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_default_serializes_to_empty_object() {
        let body = serde_json::to_value(QueryParams::default()).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn query_params_omits_unset_fields() {
        let params = QueryParams {
            natural_language_query: Some("test".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body, serde_json::json!({"natural_language_query": "test"}));
    }

    #[test]
    fn query_params_renames_return_fields() {
        let params = QueryParams {
            return_fields: Some(vec!["title".to_string()]),
            ..Default::default()
        };
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body, serde_json::json!({"return": ["title"]}));
    }

    #[test]
    fn collection_created_at_parses_rfc3339() {
        let collection = Collection {
            collection_id: "c1".to_string(),
            name: "docs".to_string(),
            description: None,
            language: None,
            created: Some("2023-03-31T12:00:00+00:00".to_string()),
        };
        let parsed = collection.created_at().unwrap();
        assert_eq!(parsed.timestamp(), 1680264000);
    }

    #[test]
    fn collection_created_at_tolerates_garbage() {
        let collection = Collection {
            collection_id: "c1".to_string(),
            name: "docs".to_string(),
            description: None,
            language: None,
            created: Some("last tuesday".to_string()),
        };
        assert!(collection.created_at().is_none());
    }

    #[test]
    fn entities_result_reads_camel_case_keys() {
        let raw = r#"{
            "status": "OK",
            "language": "english",
            "entities": [
                {"type": "Person", "relevance": "0.93", "count": "2", "text": "Ada",
                 "sentiment": {"type": "positive", "score": "0.5"}}
            ]
        }"#;
        let result: EntitiesResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].entity_type.as_deref(), Some("Person"));
        assert_eq!(
            result.entities[0]
                .sentiment
                .as_ref()
                .unwrap()
                .sentiment_type
                .as_deref(),
            Some("positive")
        );
    }

    #[test]
    fn query_result_keeps_unknown_fields() {
        let raw = r#"{"document_id": "d1", "title": "Report", "score": 3}"#;
        let result: QueryResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.document_id.as_deref(), Some("d1"));
        assert_eq!(result.fields["title"], "Report");
        assert_eq!(result.fields["score"], 3);
    }
}
