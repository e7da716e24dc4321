//! Changelog ledger.
//!
//! Append-only history of version transitions per artifact. Artifacts
//! created before the ledger existed have no rows; their history is
//! reconstructed from the fields the artifact row itself carries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::artifact::{Artifact, ChangelogEntry};

/// Changelog service
pub struct ChangelogService {
    db: SqlitePool,
}

impl ChangelogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append one entry. Called exactly once per successful payload
    /// replacement; rows are never mutated or deleted afterwards
    /// (except when the artifact itself is destroyed).
    pub async fn append(
        &self,
        artifact_id: i64,
        version: &str,
        changes: &str,
        date: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO changelog (artifact_id, version, date, changes) VALUES (?, ?, ?, ?)",
        )
        .bind(artifact_id)
        .bind(version)
        .bind(date)
        .bind(changes)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Version history for an artifact, newest first.
    ///
    /// Falls back to a single reconstructed entry when no ledger rows
    /// exist; an artifact with nothing to reconstruct from yields an
    /// empty history rather than a synthetic placeholder.
    pub async fn history(&self, artifact: &Artifact) -> Result<Vec<ChangelogEntry>> {
        let rows = sqlx::query_as::<_, ChangelogEntry>(
            r#"
            SELECT artifact_id, version, date, changes
            FROM changelog
            WHERE artifact_id = ?
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(artifact.id)
        .fetch_all(&self.db)
        .await?;

        if rows.is_empty() {
            return Ok(reconstruct(artifact).into_iter().collect());
        }

        Ok(rows)
    }
}

/// Derive a single synthetic changelog entry for an artifact that
/// predates the ledger, from its own version / last-update / changes
/// fields. Returns `None` when there is nothing to reconstruct from.
pub fn reconstruct(artifact: &Artifact) -> Option<ChangelogEntry> {
    let version = artifact
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let changes = artifact
        .last_changes
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    if version.is_none() && changes.is_none() && artifact.last_update.is_none() {
        return None;
    }

    Some(ChangelogEntry {
        artifact_id: artifact.id,
        version: version.unwrap_or_default().to_string(),
        date: artifact.last_update.unwrap_or(artifact.uploaded_at),
        changes: changes.unwrap_or_default().to_string(),
    })
}
