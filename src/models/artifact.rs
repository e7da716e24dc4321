//! Artifact and changelog row types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Full artifact row, payload included. Only the single-artifact read
/// paths (get, download) ever load this.
#[derive(Debug, Clone, FromRow)]
pub struct Artifact {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub payload: Vec<u8>,
    pub description: String,
    pub category: String,
    pub uploader_name: String,
    pub point_count: i64,
    pub config_name: String,
    /// NULL until the first token-gated update.
    pub version: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_changes: Option<String>,
}

/// Artifact row without the payload column, used by every bulk read
/// path so payload bytes never leak into list or search responses.
#[derive(Debug, Clone, FromRow)]
pub struct ArtifactSummary {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub description: String,
    pub category: String,
    pub uploader_name: String,
    pub point_count: i64,
    pub config_name: String,
    pub version: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_changes: Option<String>,
}

/// One version transition in an artifact's changelog.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ChangelogEntry {
    pub artifact_id: i64,
    pub version: String,
    pub date: DateTime<Utc>,
    pub changes: String,
}
