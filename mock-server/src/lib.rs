//! In-memory emulation of the discovery service wire contract, enough to
//! exercise the core client end-to-end: collections CRUD, project query,
//! multipart document ingestion, and the `version` / bearer-auth
//! preconditions every real call runs into.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub created: String,
}

#[derive(Clone, Debug)]
pub struct StoredDocument {
    pub document_id: String,
    pub collection_id: String,
    pub filename: String,
    pub content_type: String,
    pub metadata: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Deserialize)]
pub struct CreateCollection {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct QueryBody {
    pub natural_language_query: Option<String>,
    pub query: Option<String>,
    pub count: Option<usize>,
}

/// Every discovery call must carry a `version` date; axum rejects the
/// request with 400 when the parameter is absent.
#[derive(Deserialize)]
pub struct ApiVersion {
    pub version: String,
}

#[derive(Default)]
pub struct ServiceState {
    pub collections: HashMap<String, Collection>,
    pub documents: HashMap<String, StoredDocument>,
}

pub type Db = Arc<RwLock<ServiceState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(ServiceState::default()));
    Router::new()
        .route(
            "/v2/projects/{project_id}/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/v2/projects/{project_id}/collections/{collection_id}",
            axum::routing::delete(delete_collection),
        )
        .route("/v2/projects/{project_id}/query", post(query_project))
        .route(
            "/v2/projects/{project_id}/collections/{collection_id}/documents",
            post(add_document),
        )
        .route(
            "/v2/projects/{project_id}/collections/{collection_id}/documents/{document_id}",
            post(update_document).delete(delete_document),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Reject calls without a bearer token, mirroring the real gateway.
fn check_auth(headers: &HeaderMap) -> Result<(), StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("Bearer "))
        .unwrap_or(false);
    if authorized {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn check_version(version: &ApiVersion) -> Result<(), StatusCode> {
    if version.version.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn list_collections(
    State(db): State<Db>,
    Path(_project_id): Path<String>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    let state = db.read().await;
    let collections: Vec<&Collection> = state.collections.values().collect();
    Ok(Json(json!({ "collections": collections })))
}

async fn create_collection(
    State(db): State<Db>,
    Path(_project_id): Path<String>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
    Json(input): Json<CreateCollection>,
) -> Result<(StatusCode, Json<Collection>), StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    if input.name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let collection = Collection {
        collection_id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        language: input.language,
        created: chrono::Utc::now().to_rfc3339(),
    };
    db.write()
        .await
        .collections
        .insert(collection.collection_id.clone(), collection.clone());
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn delete_collection(
    State(db): State<Db>,
    Path((_project_id, collection_id)): Path<(String, String)>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    let mut state = db.write().await;
    state
        .collections
        .remove(&collection_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    state
        .documents
        .retain(|_, doc| doc.collection_id != collection_id);
    Ok(Json(json!({ "collection_id": collection_id, "status": "deleted" })))
}

async fn query_project(
    State(db): State<Db>,
    Path(_project_id): Path<String>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
    Json(body): Json<QueryBody>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    if body.natural_language_query.is_some() && body.query.is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let needle = body
        .natural_language_query
        .or(body.query)
        .unwrap_or_default();
    let state = db.read().await;
    let mut results: Vec<Value> = state
        .documents
        .values()
        .filter(|doc| {
            needle.is_empty()
                || String::from_utf8_lossy(&doc.content).contains(&needle)
                || doc.filename.contains(&needle)
        })
        .map(|doc| {
            json!({
                "document_id": doc.document_id,
                "filename": doc.filename,
                "collection_id": doc.collection_id,
            })
        })
        .collect();
    if let Some(count) = body.count {
        results.truncate(count);
    }
    Ok(Json(json!({
        "matching_results": results.len(),
        "results": results,
    })))
}

/// Pull the `file` and optional `metadata` fields out of a multipart form.
async fn read_document_form(
    collection_id: &str,
    document_id: String,
    multipart: &mut Multipart,
) -> Result<StoredDocument, StatusCode> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut metadata: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        // Copy the name out before consuming the field body.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| StatusCode::BAD_REQUEST)?
                    .to_vec();
                file = Some((data, filename, content_type));
            }
            Some("metadata") => {
                metadata = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            _ => {}
        }
    }

    let (content, filename, content_type) = file.ok_or(StatusCode::BAD_REQUEST)?;
    Ok(StoredDocument {
        document_id,
        collection_id: collection_id.to_string(),
        filename,
        content_type,
        metadata,
        content,
    })
}

async fn add_document(
    State(db): State<Db>,
    Path((_project_id, collection_id)): Path<(String, String)>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    if !db.read().await.collections.contains_key(&collection_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let document_id = Uuid::new_v4().to_string();
    let document = read_document_form(&collection_id, document_id.clone(), &mut multipart).await?;
    db.write()
        .await
        .documents
        .insert(document_id.clone(), document);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "document_id": document_id, "status": "processing" })),
    ))
}

async fn update_document(
    State(db): State<Db>,
    Path((_project_id, collection_id, document_id)): Path<(String, String, String)>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    if !db.read().await.documents.contains_key(&document_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let document = read_document_form(&collection_id, document_id.clone(), &mut multipart).await?;
    db.write()
        .await
        .documents
        .insert(document_id.clone(), document);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "document_id": document_id, "status": "processing" })),
    ))
}

async fn delete_document(
    State(db): State<Db>,
    Path((_project_id, _collection_id, document_id)): Path<(String, String, String)>,
    Query(version): Query<ApiVersion>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&headers)?;
    check_version(&version)?;
    db.write()
        .await
        .documents
        .remove(&document_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "document_id": document_id, "status": "deleted" })))
}
