//! Config Depot - Backend Library
//!
//! Anonymous exchange service for versioned data.json configuration
//! artifacts: upload, paginated listing and search, raw download,
//! token-gated updates with a changelog, and usage statistics.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod payload;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
