//! Artifact handlers: upload, listing, search, download, token-gated
//! update with changelog, and password-gated deletion.
//!
//! Validation and authorization are checked before the store is
//! touched, so client faults never leave side effects behind.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::api::download_response::DownloadResponse;
use crate::api::dto::{
    ArtifactResponse, ChangelogEntryResponse, ChangelogResponse, DeleteRequest, ListQuery,
    ListResponse, Pagination, SearchQuery, SearchResponse, TokenRequest, TokenResponse,
    UpdateRequest, UpdateResponse, UploadRequest, UploadResponse,
};
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::external_id;
use crate::models::version;
use crate::services::artifact_service::NewArtifact;

/// Filename served for every payload download.
const DOWNLOAD_FILENAME: &str = "data.json";

/// Create artifact routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(upload_artifact).get(list_artifacts))
        .route("/search", get(search_artifacts))
        .route(
            "/:id",
            get(get_artifact)
                .put(update_artifact)
                .delete(delete_artifact),
        )
        .route("/:id/download", get(download_artifact))
        .route("/:id/token", post(request_update_token))
        .route("/:id/changelog", get(get_changelog))
}

/// Upload a new artifact
pub async fn upload_artifact(
    State(state): State<SharedState>,
    Json(request): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let created = state
        .artifact_service()
        .create(NewArtifact {
            name: request.name,
            description: request.description,
            uploader_name: request.uploader_name,
            category: request.category,
            data: request.data,
            point_count: request.point_count,
            config_name: request.config_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: external_id::render(created.id),
            uploaded_at: created.uploaded_at,
            version: version::DISPLAY_DEFAULT.to_string(),
        }),
    ))
}

/// List artifacts with pagination and optional category filter
pub async fn list_artifacts(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let pagination = query.pagination();
    let (entries, total) = state
        .artifact_service()
        .list(
            pagination.page(),
            pagination.per_page(),
            query.category.as_deref(),
        )
        .await?;

    Ok(Json(ListResponse {
        artifacts: entries.into_iter().map(ArtifactResponse::from).collect(),
        pagination: Pagination::from_query_and_total(&pagination, total),
    }))
}

/// Free-text search over artifact metadata
pub async fn search_artifacts(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let entries = state.artifact_service().search(&query.q).await?;

    Ok(Json(SearchResponse {
        results: entries.into_iter().map(ArtifactResponse::from).collect(),
    }))
}

/// Get artifact metadata by external id
pub async fn get_artifact(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ArtifactResponse>> {
    let id = external_id::parse(&id)?;
    let summary = state.artifact_service().get_summary(id).await?;
    Ok(Json(ArtifactResponse::from(summary)))
}

/// Download the raw payload bytes
pub async fn download_artifact(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<DownloadResponse> {
    let id = external_id::parse(&id)?;
    let (artifact, bytes) = state.artifact_service().download(id).await?;

    Ok(DownloadResponse::new(
        Bytes::from(bytes),
        artifact.mime_type,
        DOWNLOAD_FILENAME,
    ))
}

/// Request a single-use update token for an artifact
pub async fn request_update_token(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let id = external_id::parse(&id)?;

    if request.secret != state.config.update_secret {
        return Err(AppError::Unauthorized("invalid update secret".to_string()));
    }
    if !state.artifact_service().exists(id).await? {
        return Err(AppError::NotFound("Artifact not found".to_string()));
    }

    let token = state.update_tokens.issue(id);

    Ok(Json(TokenResponse {
        token,
        expires_in_secs: state.update_tokens.ttl().as_secs(),
    }))
}

/// Replace an artifact's payload using a previously issued token
pub async fn update_artifact(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>> {
    let id = external_id::parse(&id)?;

    // Validate before redeeming so a client fault does not consume the
    // token.
    if serde_json::from_str::<Value>(&request.data).is_err() {
        return Err(AppError::Validation(
            "data is not a well-formed JSON document".to_string(),
        ));
    }
    if request.changes.trim().is_empty() {
        return Err(AppError::Validation("changes is required".to_string()));
    }

    // Expired and wrong tokens are deliberately indistinguishable.
    if !state.update_tokens.redeem(id, &request.token) {
        return Err(AppError::Unauthorized(
            "invalid or expired update token".to_string(),
        ));
    }

    let next = state
        .artifact_service()
        .replace_payload(id, &request.data, &request.changes)
        .await?;

    Ok(Json(UpdateResponse {
        version: next.to_string(),
    }))
}

/// Version history for an artifact, newest first
pub async fn get_changelog(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ChangelogResponse>> {
    let id = external_id::parse(&id)?;
    let artifact = state.artifact_service().get(id).await?;
    let entries = state.changelog_service().history(&artifact).await?;

    Ok(Json(ChangelogResponse {
        entries: entries
            .into_iter()
            .map(ChangelogEntryResponse::from)
            .collect(),
    }))
}

/// Permanently delete an artifact
pub async fn delete_artifact(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<Value>> {
    let id = external_id::parse(&id)?;

    if request.secret != state.config.delete_secret {
        return Err(AppError::Unauthorized("invalid delete secret".to_string()));
    }

    state.artifact_service().delete(id).await?;

    Ok(Json(json!({ "deleted": true })))
}
