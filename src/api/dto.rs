//! Shared Data Transfer Objects (DTOs) for API handlers.
//!
//! Field names follow the historical camelCase wire format, and
//! artifact ids always appear in their zero-padded external form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::artifact::{ArtifactSummary, ChangelogEntry};
use crate::models::external_id;
use crate::models::version;
use crate::services::artifact_service::MAX_PAGE_SIZE;
use crate::services::stats_service::{CategoryCount, UploaderCount, UsageStats};

/// Pagination metadata for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total: i64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination from query parameters and total count.
    pub fn from_query_and_total(query: &PaginationQuery, total: i64) -> Self {
        let page = query.page();
        let per_page = query.per_page();
        let total_pages = if total == 0 {
            0
        } else {
            ((total as f64) / (per_page as f64)).ceil() as u32
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Query parameters for paginated list requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    /// Requested page number (default: 1)
    pub page: Option<u32>,
    /// Requested items per page (default: 20, capped at 50)
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    /// Get the page number, defaulting to 1 if not specified.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the per_page value, defaulted and clamped to the cap.
    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Query parameters for the artifact list endpoint.
///
/// Pagination fields are repeated here rather than flattened in:
/// query-string deserialization cannot see through `serde(flatten)`
/// for non-string fields.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Requested page number (default: 1)
    pub page: Option<u32>,
    /// Requested items per page (default: 20, capped at 50)
    pub per_page: Option<u32>,
    /// Category filter; absent or "All" returns every category.
    pub category: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Query parameters for the search endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Free-text search term
    pub q: String,
}

/// Upload request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub name: String,
    pub description: String,
    pub uploader_name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// The data.json content: one JSON document, as a string.
    pub data: String,
    #[serde(default)]
    pub point_count: Option<i64>,
    #[serde(default)]
    pub config_name: Option<String>,
}

/// Upload response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// External zero-padded artifact id
    pub id: String,
    pub uploaded_at: DateTime<Utc>,
    pub version: String,
}

/// Metadata view of an artifact. Never carries payload bytes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactResponse {
    /// External zero-padded artifact id
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub uploader_name: String,
    pub point_count: i64,
    pub config_name: String,
    pub version: String,
    pub uploaded_at: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_changes: Option<String>,
}

impl From<ArtifactSummary> for ArtifactResponse {
    fn from(s: ArtifactSummary) -> Self {
        Self {
            id: external_id::render(s.id),
            name: s.name,
            description: s.description,
            category: s.category,
            uploader_name: s.uploader_name,
            point_count: s.point_count,
            config_name: s.config_name,
            version: s.version.unwrap_or_else(|| version::DISPLAY_DEFAULT.into()),
            uploaded_at: s.uploaded_at,
            last_update: s.last_update,
            last_changes: s.last_changes,
        }
    }
}

/// Paginated list response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse {
    pub artifacts: Vec<ArtifactResponse>,
    pub pagination: Pagination,
}

/// Search response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<ArtifactResponse>,
}

/// Update-token request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Shared update secret
    pub secret: String,
}

/// Update-token response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Token-gated update request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRequest {
    /// A previously issued, unconsumed update token
    pub token: String,
    /// Replacement data.json content: one JSON document, as a string.
    pub data: String,
    /// Description of what changed
    pub changes: String,
}

/// Update response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateResponse {
    pub version: String,
}

/// Delete request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteRequest {
    /// Shared delete secret
    pub secret: String,
}

/// One changelog entry as rendered to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangelogEntryResponse {
    pub version: String,
    pub date: DateTime<Utc>,
    pub changes: String,
}

impl From<ChangelogEntry> for ChangelogEntryResponse {
    fn from(e: ChangelogEntry) -> Self {
        Self {
            version: e.version,
            date: e.date,
            changes: e.changes,
        }
    }
}

/// Changelog response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangelogResponse {
    pub entries: Vec<ChangelogEntryResponse>,
}

/// Usage statistics response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_artifacts: i64,
    pub by_category: Vec<CategoryCount>,
    pub by_uploader: Vec<UploaderCount>,
    pub recent_uploads: Vec<ArtifactResponse>,
}

impl From<UsageStats> for StatsResponse {
    fn from(stats: UsageStats) -> Self {
        Self {
            total_artifacts: stats.total_artifacts,
            by_category: stats.by_category,
            by_uploader: stats.by_uploader,
            recent_uploads: stats
                .recent
                .into_iter()
                .map(ArtifactResponse::from)
                .collect(),
        }
    }
}
