//! Business logic services.

pub mod artifact_service;
pub mod changelog_service;
pub mod stats_service;
pub mod token_service;
