use crate::analysis::{analyze_url, AnalysisResult, ErrorBody, CLIENT_UPLOAD_FILE_NAME, VIDEO_FIELD};
use crate::config::ClientConfig;
use crate::error::SubmissionError;
use crate::media::MediaSource;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sends media to the relay and waits for the analysis.
///
/// One submission at a time: callers must not issue overlapping `submit`
/// calls, nothing here serializes them.
pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl SubmissionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SubmissionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(SubmissionError::Transport)?;

        Ok(Self {
            http,
            endpoint: analyze_url(&config.relay_url),
            timeout: config.timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload `source` as `video`/`video.mp4` and decode the relay's answer
    pub async fn submit(&self, source: &MediaSource) -> Result<AnalysisResult, SubmissionError> {
        info!(
            "Submitting {} video ({} bytes) to {}",
            source.kind(),
            source.len(),
            self.endpoint
        );

        let form = Form::new().part(VIDEO_FIELD, video_part(source));

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.json::<ErrorBody>().await.ok().map(|b| b.error);
            warn!(
                "Relay rejected analysis with HTTP {}: {}",
                status.as_u16(),
                message.as_deref().unwrap_or("<no error body>")
            );
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let result = response.json::<AnalysisResult>().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                SubmissionError::InvalidResponse {
                    details: e.to_string(),
                }
            }
        })?;

        debug!(
            "Analysis received: upper={} back={} front={}",
            result.avg_upper_body_angle, result.avg_back_leg_angle, result.avg_front_leg_angle
        );
        Ok(result)
    }

    fn classify(&self, error: reqwest::Error) -> SubmissionError {
        match self.timeout {
            Some(timeout) if error.is_timeout() => SubmissionError::Timeout {
                seconds: timeout.as_secs(),
            },
            _ => SubmissionError::Transport(error),
        }
    }
}

fn video_part(source: &MediaSource) -> Part {
    let build = || Part::stream(source.data().clone()).file_name(CLIENT_UPLOAD_FILE_NAME);

    build().mime_str(source.mime_type()).unwrap_or_else(|e| {
        warn!("Ignoring unusable MIME type {:?}: {}", source.mime_type(), e);
        build()
    })
}
