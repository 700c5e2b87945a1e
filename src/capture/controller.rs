use super::device::{CaptureDevice, MediaStream, PreviewSink, Recorder};
use crate::error::CameraError;
use crate::media::MediaSource;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Recording session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    CameraActive,
    Recording,
    /// A recording was emitted; the camera is still live
    Stopped,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "idle"),
            RecordingState::CameraActive => write!(f, "camera active"),
            RecordingState::Recording => write!(f, "recording"),
            RecordingState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Drives camera acquisition, preview binding and recording
pub struct CaptureController {
    device: Arc<dyn CaptureDevice>,
    preview: Option<Arc<dyn PreviewSink>>,
    stream: Option<Box<dyn MediaStream>>,
    recorder: Option<Recorder>,
    state: RecordingState,
}

impl CaptureController {
    pub fn new(device: Arc<dyn CaptureDevice>, preview: Option<Arc<dyn PreviewSink>>) -> Self {
        Self {
            device,
            preview,
            stream: None,
            recorder: None,
            state: RecordingState::Idle,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_camera_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Open the camera and bind it to the preview
    pub async fn acquire_camera(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() {
            debug!("Camera already active ({})", self.state);
            return Ok(());
        }

        let stream = self.device.open_video_stream().await.map_err(|e| {
            warn!("Camera acquisition failed: {}", e);
            e
        })?;

        if let Some(preview) = &self.preview {
            preview.bind(stream.id());
        }

        info!("Camera stream {} acquired", stream.id());
        self.stream = Some(stream);
        self.state = RecordingState::CameraActive;
        Ok(())
    }

    /// Stop every track and return to idle; an unfinished recording is discarded
    pub fn release_camera(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            debug!("release_camera ignored: no active stream");
            return;
        };

        if self.recorder.take().is_some() {
            warn!("Camera released while recording; discarding partial recording");
        }

        stream.stop_tracks();
        if let Some(preview) = &self.preview {
            preview.unbind();
        }

        info!("Camera stream {} released", stream.id());
        self.state = RecordingState::Idle;
    }

    /// Begin buffering a new recording.
    ///
    /// Returns `Ok(false)` without side effects unless the camera is live and
    /// not already recording.
    pub async fn start_recording(&mut self) -> Result<bool, CameraError> {
        if !matches!(
            self.state,
            RecordingState::CameraActive | RecordingState::Stopped
        ) {
            debug!("start_recording ignored in state {}", self.state);
            return Ok(false);
        }

        let Some(stream) = self.stream.as_mut() else {
            debug!("start_recording ignored: no active stream");
            return Ok(false);
        };

        let recorder = stream.start_recorder().await?;
        self.recorder = Some(recorder);
        self.state = RecordingState::Recording;

        info!("Recording started on stream {}", stream.id());
        Ok(true)
    }

    /// Finalize the current recording into a single `video/mp4` blob
    pub async fn stop_recording(&mut self) -> Option<MediaSource> {
        if self.state != RecordingState::Recording {
            debug!("stop_recording ignored in state {}", self.state);
            return None;
        }

        let recorder = self.recorder.take()?;
        let blob = recorder.finish().await;
        self.state = RecordingState::Stopped;

        info!("Recording stopped ({} bytes)", blob.len());
        Some(MediaSource::recorded(blob))
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            stream.stop_tracks();
        }
    }
}
