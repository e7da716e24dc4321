//! OpenAPI schema for the artifact exchange API.

use utoipa::OpenApi;

use super::dto;
use crate::services::stats_service;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Config Depot API",
        description = "Anonymous exchange of versioned data.json configuration artifacts",
    ),
    components(schemas(
        dto::UploadRequest,
        dto::UploadResponse,
        dto::ArtifactResponse,
        dto::ListResponse,
        dto::SearchResponse,
        dto::Pagination,
        dto::TokenRequest,
        dto::TokenResponse,
        dto::UpdateRequest,
        dto::UpdateResponse,
        dto::DeleteRequest,
        dto::ChangelogEntryResponse,
        dto::ChangelogResponse,
        dto::StatsResponse,
        stats_service::CategoryCount,
        stats_service::UploaderCount,
    )),
    tags(
        (name = "artifacts", description = "Artifact upload, retrieval, update, and deletion"),
        (name = "stats", description = "Usage statistics"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI document.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
