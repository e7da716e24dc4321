//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// Shared secret required to request an update token
    pub update_secret: String,

    /// Shared secret required to delete an artifact
    pub delete_secret: String,

    /// Lifetime of a single-use update token, in seconds
    pub update_token_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            update_secret: env::var("UPDATE_SECRET")
                .map_err(|_| AppError::Config("UPDATE_SECRET not set".into()))?,
            delete_secret: env::var("DELETE_SECRET")
                .map_err(|_| AppError::Config("DELETE_SECRET not set".into()))?,
            update_token_ttl_secs: env::var("UPDATE_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "600".into())
                .parse()
                .unwrap_or(600),
        })
    }
}
