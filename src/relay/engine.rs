use crate::analysis::{analyze_url, VIDEO_FIELD};
use crate::config::EngineConfig;
use crate::error::RelayError;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name attached when re-posting a staged upload to the engine
pub const ENGINE_UPLOAD_FILE_NAME: &str = "captured_video.mp4";

const MAX_LOGGED_BODY: usize = 512;

/// Forwards staged uploads to the external pose engine
pub struct EngineClient {
    http: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl EngineClient {
    pub fn new(config: &EngineConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::StartupFailed {
                details: format!("Failed to build engine HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            url: analyze_url(&config.base_url),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the video and return the engine's JSON body untouched
    pub async fn forward(
        &self,
        video: Bytes,
        mime_type: &str,
    ) -> Result<serde_json::Value, RelayError> {
        info!("Forwarding {} bytes to analysis engine {}", video.len(), self.url);

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.call(video, mime_type))
                .await
                .map_err(|_| RelayError::EngineTimeout {
                    seconds: timeout.as_secs(),
                })?,
            None => self.call(video, mime_type).await,
        }
    }

    async fn call(&self, video: Bytes, mime_type: &str) -> Result<serde_json::Value, RelayError> {
        let form = Form::new().part(VIDEO_FIELD, engine_part(video, mime_type));

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::EngineUnreachable {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::EngineUnreachable {
                url: self.url.clone(),
                source: e,
            })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let body = text.chars().take(MAX_LOGGED_BODY).collect();
            return Err(RelayError::EngineStatus {
                status: status.as_u16(),
                body,
            });
        }

        let value = serde_json::from_slice::<serde_json::Value>(&body).map_err(|e| {
            RelayError::InvalidEngineResponse {
                details: e.to_string(),
            }
        })?;

        debug!("Engine answered {} with {} bytes", status, body.len());
        Ok(value)
    }
}

fn engine_part(video: Bytes, mime_type: &str) -> Part {
    let build = |video: Bytes| Part::stream(video).file_name(ENGINE_UPLOAD_FILE_NAME);

    match build(video.clone()).mime_str(mime_type) {
        Ok(part) => part,
        Err(e) => {
            warn!("Forwarding without MIME type {:?}: {}", mime_type, e);
            build(video)
        }
    }
}
