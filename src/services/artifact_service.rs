//! Artifact service.
//!
//! The durable entry store: creation with validation, single-artifact
//! reads, paginated listing, search, token-gated payload replacement,
//! and permanent deletion.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::models::artifact::{Artifact, ArtifactSummary};
use crate::models::version::Version;
use crate::payload;
use crate::services::changelog_service::ChangelogService;

/// Maximum accepted length for the artifact name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum accepted length for the description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Hard cap on page size for list and search responses.
pub const MAX_PAGE_SIZE: u32 = 50;

const SUMMARY_COLUMNS: &str = "id, name, mime_type, description, category, uploader_name, \
     point_count, config_name, version, uploaded_at, last_update, last_changes";

/// Sentinel category filter meaning "all categories".
const ALL_CATEGORIES: &str = "All";

/// A validated-on-entry upload request.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub name: String,
    pub description: String,
    pub uploader_name: String,
    pub category: Option<String>,
    /// The payload as submitted: one JSON document.
    pub data: String,
    pub point_count: Option<i64>,
    pub config_name: Option<String>,
}

/// Outcome of a successful creation.
#[derive(Debug, Clone)]
pub struct CreatedArtifact {
    pub id: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Artifact service
pub struct ArtifactService {
    db: SqlitePool,
    changelog: ChangelogService,
}

impl ArtifactService {
    /// Create a new artifact service
    pub fn new(db: SqlitePool) -> Self {
        let changelog = ChangelogService::new(db.clone());
        Self { db, changelog }
    }

    /// Insert a new artifact.
    ///
    /// Validation happens before the store is touched: required fields
    /// must be non-empty after trimming, bounded fields within their
    /// limits, and the payload a well-formed JSON document.
    pub async fn create(&self, new: NewArtifact) -> Result<CreatedArtifact> {
        let name = require_trimmed(&new.name, "name")?;
        if name.len() > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "name exceeds {MAX_NAME_LEN} characters"
            )));
        }
        let description = require_trimmed(&new.description, "description")?;
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(format!(
                "description exceeds {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        let uploader_name = require_trimmed(&new.uploader_name, "uploaderName")?;
        validate_json_document(&new.data)?;

        let category = new
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("General")
            .to_string();
        let point_count = new.point_count.unwrap_or(0);
        let config_name = new
            .config_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Default")
            .to_string();

        let uploaded_at = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO artifacts (
                name, mime_type, payload, description, category,
                uploader_name, point_count, config_name, uploaded_at
            )
            VALUES (?, 'application/json', ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(new.data.as_bytes())
        .bind(&description)
        .bind(&category)
        .bind(&uploader_name)
        .bind(point_count)
        .bind(&config_name)
        .bind(uploaded_at)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(artifact_id = id, uploader = %uploader_name, "Artifact created");

        Ok(CreatedArtifact { id, uploaded_at })
    }

    /// Get a full artifact row by ID, payload included.
    pub async fn get(&self, id: i64) -> Result<Artifact> {
        sqlx::query_as::<_, Artifact>("SELECT * FROM artifacts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Artifact not found".to_string()))
    }

    /// Get the metadata-only view of an artifact.
    pub async fn get_summary(&self, id: i64) -> Result<ArtifactSummary> {
        sqlx::query_as::<_, ArtifactSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM artifacts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artifact not found".to_string()))
    }

    /// Whether an artifact with this id exists.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM artifacts WHERE id = ?")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// List artifact summaries, newest first, with 1-based pagination.
    ///
    /// `page_size` is clamped to [`MAX_PAGE_SIZE`]. The category filter
    /// compares case-insensitively; `None`, an empty string, or the
    /// `"All"` sentinel return every category.
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
        category: Option<&str>,
    ) -> Result<(Vec<ArtifactSummary>, i64)> {
        let page = page.max(1);
        let limit = page_size.clamp(1, MAX_PAGE_SIZE) as i64;
        let offset = (page as i64 - 1) * limit;
        let filter = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));

        let entries = sqlx::query_as::<_, ArtifactSummary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM artifacts
            WHERE (?1 IS NULL OR category = ?1 COLLATE NOCASE)
            ORDER BY uploaded_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM artifacts WHERE (?1 IS NULL OR category = ?1 COLLATE NOCASE)",
        )
        .bind(filter)
        .fetch_one(&self.db)
        .await?;

        Ok((entries, total))
    }

    /// Case-insensitive substring search across name, description,
    /// uploader, and category. Capped at [`MAX_PAGE_SIZE`] results,
    /// newest first.
    pub async fn search(&self, term: &str) -> Result<Vec<ArtifactSummary>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::Validation("search term is required".to_string()));
        }
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));

        let entries = sqlx::query_as::<_, ArtifactSummary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM artifacts
            WHERE lower(name) LIKE ?1 ESCAPE '\'
               OR lower(description) LIKE ?1 ESCAPE '\'
               OR lower(uploader_name) LIKE ?1 ESCAPE '\'
               OR lower(category) LIKE ?1 ESCAPE '\'
            ORDER BY uploaded_at DESC, id DESC
            LIMIT ?2
            "#
        ))
        .bind(&pattern)
        .bind(MAX_PAGE_SIZE as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Replace an artifact's payload, bumping the patch component of
    /// its version and appending a changelog entry.
    ///
    /// Only reachable through the token-gated update flow: callers
    /// must have redeemed a live update token for this artifact first.
    pub async fn replace_payload(
        &self,
        id: i64,
        data: &str,
        changes: &str,
    ) -> Result<Version> {
        validate_json_document(data)?;
        let changes = require_trimmed(changes, "changes")?;

        let stored_version: Option<String> =
            sqlx::query_scalar("SELECT version FROM artifacts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Artifact not found".to_string()))?;

        // A malformed stored version is a data-integrity fault, not a
        // reason to silently restart the artifact's history.
        let current = Version::parse(stored_version.as_deref().unwrap_or("")).map_err(|e| {
            AppError::Internal(format!("artifact {id} has a malformed stored version: {e}"))
        })?;
        let next = current.bump_patch();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE artifacts
            SET payload = ?, version = ?, last_update = ?, last_changes = ?
            WHERE id = ?
            "#,
        )
        .bind(data.as_bytes())
        .bind(next.to_string())
        .bind(now)
        .bind(&changes)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Artifact not found".to_string()));
        }

        self.changelog
            .append(id, &next.to_string(), &changes, now)
            .await?;

        tracing::info!(artifact_id = id, version = %next, "Artifact payload replaced");

        Ok(next)
    }

    /// Normalized payload bytes for download, with the filename to
    /// serve them under.
    pub async fn download(&self, id: i64) -> Result<(Artifact, Vec<u8>)> {
        let artifact = self.get(id).await?;
        let bytes = payload::normalize_stored(&artifact.payload).map_err(|e| {
            tracing::error!(artifact_id = id, error = %e, "Unreconstructible stored payload");
            e
        })?;
        Ok((artifact, bytes))
    }

    /// Permanently delete an artifact and its changelog rows.
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM changelog WHERE artifact_id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        let result = sqlx::query("DELETE FROM artifacts WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Artifact not found".to_string()));
        }

        tracing::info!(artifact_id = id, "Artifact deleted");
        Ok(())
    }
}

/// Escape `LIKE` metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn require_trimmed(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_json_document(data: &str) -> Result<()> {
    serde_json::from_str::<serde_json::Value>(data)
        .map(|_| ())
        .map_err(|_| AppError::Validation("data is not a well-formed JSON document".to_string()))
}
