use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use na_core::input::articles_from_csv;
use na_core::Error;
use serde_json::json;

use crate::AppState;

const UPLOAD_FIELD: &str = "file";

/// Error response with a `{"error": ...}` body, 400 unless the upload
/// itself was rejected with a more specific status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::MissingColumn(column) => {
                ApiError::bad_request(format!("CSV must contain an '{}' column.", column))
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        let status = error.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Upload is too large.".to_string()
        } else {
            error.body_text()
        };
        Self { status, message }
    }
}

/// Accepts a CSV upload and answers with the batch analysis of its
/// `Article` column.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let upload =
        upload.ok_or_else(|| ApiError::bad_request(format!("Missing '{}' upload.", UPLOAD_FIELD)))?;
    let articles = articles_from_csv(&upload[..])?;
    tracing::info!("📥 Received {} article(s) for analysis", articles.len());

    let output = state.processor.process_batch(&articles).await;
    Ok(Json(output))
}
