//! HTTP request handlers.

pub mod artifacts;
pub mod health;
pub mod stats;
