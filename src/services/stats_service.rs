//! Usage statistics over the entry store.
//!
//! All aggregation is computed on demand; the dataset is small and
//! read-mostly, so nothing here is cached.

use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::artifact::ArtifactSummary;

/// How many of the most recent uploads the stats view includes.
const RECENT_LIMIT: i64 = 5;

/// Artifact count for one category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Artifact count for one uploader.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploaderCount {
    pub uploader_name: String,
    pub count: i64,
}

/// Aggregate usage statistics.
#[derive(Debug)]
pub struct UsageStats {
    pub total_artifacts: i64,
    pub by_category: Vec<CategoryCount>,
    pub by_uploader: Vec<UploaderCount>,
    pub recent: Vec<ArtifactSummary>,
}

/// Statistics service
pub struct StatsService {
    db: SqlitePool,
}

impl StatsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Compute the current usage statistics.
    pub async fn usage(&self) -> Result<UsageStats> {
        let total_artifacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artifacts")
            .fetch_one(&self.db)
            .await?;

        let by_category = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT category, COUNT(*) AS count
            FROM artifacts
            GROUP BY category COLLATE NOCASE
            ORDER BY count DESC, category ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let by_uploader = sqlx::query_as::<_, UploaderCount>(
            r#"
            SELECT uploader_name, COUNT(*) AS count
            FROM artifacts
            GROUP BY uploader_name
            ORDER BY count DESC, uploader_name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let recent = sqlx::query_as::<_, ArtifactSummary>(
            r#"
            SELECT id, name, mime_type, description, category, uploader_name,
                   point_count, config_name, version, uploaded_at, last_update, last_changes
            FROM artifacts
            ORDER BY uploaded_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(UsageStats {
            total_artifacts,
            by_category,
            by_uploader,
            recent,
        })
    }
}
