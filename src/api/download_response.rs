//! Raw payload download response.
//!
//! Serves normalized payload bytes as an attachment so clients receive
//! the original data.json document rather than a JSON-wrapped body.

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// Streamed byte content with a download filename.
pub struct DownloadResponse {
    data: Bytes,
    content_type: String,
    filename: String,
}

impl DownloadResponse {
    pub fn new(
        data: Bytes,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            data,
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

impl IntoResponse for DownloadResponse {
    fn into_response(self) -> Response {
        let built = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type)
            .header(CONTENT_LENGTH, self.data.len())
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .body(Body::from(self.data));

        match built {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build download response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
