use crate::analysis::AnalysisResult;
use crate::capture::{CaptureController, RecordingState};
use crate::client::SubmissionClient;
use crate::error::{CameraError, PosecamError, Result};
use crate::events::{EventBus, SessionEvent};
use crate::media::{MediaSource, UploadedFile};
use crate::presenter::{present, Presentation};
use crate::source::SourceSelector;
use std::time::SystemTime;
use tracing::{debug, info};

const CAMERA_FAILURE: &str = "Failed to access camera";
const ANALYSIS_FAILURE: &str = "Failed to analyze pose";

/// One user's capture → submit → display flow.
///
/// Failures are published as error notifications and returned; the session
/// keeps its previous source and result so the user can retry.
pub struct PoseSession {
    capture: CaptureController,
    sources: SourceSelector,
    client: SubmissionClient,
    events: EventBus,
    latest: Option<(AnalysisResult, Presentation)>,
}

impl PoseSession {
    pub fn new(capture: CaptureController, client: SubmissionClient, events: EventBus) -> Self {
        Self {
            capture,
            sources: SourceSelector::new(),
            client,
            events,
            latest: None,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn recording_state(&self) -> RecordingState {
        self.capture.state()
    }

    pub fn active_source(&self) -> Option<&MediaSource> {
        self.sources.active_source()
    }

    pub fn latest_result(&self) -> Option<&AnalysisResult> {
        self.latest.as_ref().map(|(result, _)| result)
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.latest.as_ref().map(|(_, presentation)| presentation)
    }

    pub async fn start_camera(&mut self) -> std::result::Result<(), CameraError> {
        let was_active = self.capture.is_camera_active();

        match self.capture.acquire_camera().await {
            Ok(()) => {
                if !was_active {
                    self.events.notify(SessionEvent::CameraStatusChanged {
                        active: true,
                        timestamp: SystemTime::now(),
                    });
                }
                Ok(())
            }
            Err(e) => {
                self.events
                    .notify(SessionEvent::error_notification(CAMERA_FAILURE));
                Err(e)
            }
        }
    }

    pub fn stop_camera(&mut self) {
        if !self.capture.is_camera_active() {
            return;
        }

        self.capture.release_camera();
        self.events.notify(SessionEvent::CameraStatusChanged {
            active: false,
            timestamp: SystemTime::now(),
        });
    }

    pub async fn start_recording(&mut self) -> std::result::Result<bool, CameraError> {
        match self.capture.start_recording().await {
            Ok(true) => {
                self.events.notify(SessionEvent::RecordingStarted {
                    timestamp: SystemTime::now(),
                });
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                self.events.notify(SessionEvent::error_notification(format!(
                    "Failed to start recording: {}",
                    e
                )));
                Err(e)
            }
        }
    }

    /// Finalize the recording and make it the active source
    pub async fn stop_recording(&mut self) -> Option<&MediaSource> {
        let source = self.capture.stop_recording().await?;

        self.events.notify(SessionEvent::RecordingStopped {
            bytes: source.len(),
            timestamp: SystemTime::now(),
        });
        self.events.notify(SessionEvent::SourceSelected {
            kind: source.kind(),
            bytes: source.len(),
        });

        Some(self.sources.register(source))
    }

    pub fn upload(&mut self, file: UploadedFile) -> &MediaSource {
        let source = self.sources.handle_upload(file);

        self.events.notify(SessionEvent::SourceSelected {
            kind: source.kind(),
            bytes: source.len(),
        });
        source
    }

    /// Submit the active source and keep the decoded result.
    ///
    /// Returns `Ok(None)` when there is nothing to submit.
    pub async fn analyze(&mut self) -> Result<Option<&Presentation>> {
        let Some(source) = self.sources.active_source().cloned() else {
            debug!("analyze ignored: no recorded or uploaded video");
            return Ok(None);
        };

        self.events
            .notify(SessionEvent::AnalysisStarted { kind: source.kind() });

        let outcome = match self.client.submit(&source).await {
            Ok(result) => present(&result)
                .map(|presentation| (result, presentation))
                .map_err(PosecamError::from),
            Err(e) => Err(PosecamError::from(e)),
        };

        match outcome {
            Ok(latest) => {
                info!("Analysis of {} video complete", source.kind());
                self.latest = Some(latest);
                self.events.notify(SessionEvent::AnalysisCompleted {
                    timestamp: SystemTime::now(),
                });
                Ok(self.presentation())
            }
            Err(e) => {
                self.events
                    .notify(SessionEvent::error_notification(ANALYSIS_FAILURE));
                Err(e)
            }
        }
    }

    /// Release the camera and forget sources and results
    pub fn end(&mut self) {
        self.stop_camera();
        self.sources.clear();
        self.latest = None;
    }
}
