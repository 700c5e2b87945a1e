use crate::analysis::{ErrorBody, VIDEO_FIELD};
use crate::error::RelayError;
use crate::media::RECORDING_MIME_TYPE;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::{error, info, warn};

use super::server::RelayState;

/// Message sent for every relay-side failure; details stay in the logs
pub const RELAY_FAILURE_MESSAGE: &str = "Failed to analyze pose video";

/// The `video` field pulled out of an incoming multipart body
#[derive(Debug)]
pub(crate) struct VideoUpload {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub data: Bytes,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // Callers only ever see the generic message; the cause was logged
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(RELAY_FAILURE_MESSAGE)),
        )
            .into_response()
    }
}

/// Handler for `POST /analyze-pose-video`
pub async fn analyze_pose_video_handler(
    State(state): State<RelayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match extract_video(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Rejected analysis upload: {}", e);
            return e.into_response();
        }
    };

    info!(
        "Received {} bytes ({}, {})",
        upload.data.len(),
        upload.file_name.as_deref().unwrap_or("unnamed"),
        upload.mime_type
    );

    match relay_upload(&state, upload).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            error!("Error analyzing pose video: {}", e);
            e.into_response()
        }
    }
}

/// Stage, forward and always clean up
async fn relay_upload(
    state: &RelayState,
    upload: VideoUpload,
) -> Result<serde_json::Value, RelayError> {
    let staged = state.staging.stage(&upload.data).await?;

    let result = state.engine.forward(upload.data, &upload.mime_type).await;

    staged.release().await;
    result
}

pub(crate) async fn extract_video(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<VideoUpload, RelayError> {
    let mut multipart = multipart.map_err(|e| RelayError::BadRequest {
        details: format!("Expected a multipart body: {}", e.body_text()),
    })?;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| RelayError::BadRequest {
                details: format!("Malformed multipart body: {}", e.body_text()),
            })?;

        let Some(field) = field else {
            return Err(RelayError::BadRequest {
                details: format!("Missing `{}` field", VIDEO_FIELD),
            });
        };

        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mime_type = field
            .content_type()
            .unwrap_or(RECORDING_MIME_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(|e| RelayError::BadRequest {
            details: format!("Failed to read `{}` field: {}", VIDEO_FIELD, e.body_text()),
        })?;

        return Ok(VideoUpload {
            file_name,
            mime_type,
            data,
        });
    }
}

/// Handler for health check endpoint
pub async fn health_handler(State(state): State<RelayState>) -> impl IntoResponse {
    let health_info = serde_json::json!({
        "status": "healthy",
        "engine_url": state.engine.url(),
        "staging": {
            "dir": state.staging.dir().display().to_string(),
            "naming": state.staging.naming(),
        },
    });

    (StatusCode::OK, Json(health_info))
}
