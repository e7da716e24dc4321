//! Data models.

pub mod artifact;
pub mod external_id;
pub mod version;
