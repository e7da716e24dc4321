//! API module - HTTP handlers and shared state.

pub mod download_response;
pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::artifact_service::ArtifactService;
use crate::services::changelog_service::ChangelogService;
use crate::services::stats_service::StatsService;
use crate::services::token_service::UpdateTokenStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    /// Live single-use update tokens; process-local by design.
    pub update_tokens: Arc<UpdateTokenStore>,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let ttl = Duration::from_secs(config.update_token_ttl_secs);
        Self {
            config,
            db,
            update_tokens: Arc::new(UpdateTokenStore::new(ttl)),
        }
    }

    pub fn artifact_service(&self) -> ArtifactService {
        ArtifactService::new(self.db.clone())
    }

    pub fn changelog_service(&self) -> ChangelogService {
        ChangelogService::new(self.db.clone())
    }

    pub fn stats_service(&self) -> StatsService {
        StatsService::new(self.db.clone())
    }
}

pub type SharedState = Arc<AppState>;
