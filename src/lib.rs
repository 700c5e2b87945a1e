pub mod analysis;
pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod presenter;
pub mod relay;
pub mod session;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{AnalysisResult, ErrorBody, ANALYZE_PATH, VIDEO_FIELD};
pub use capture::{
    CaptureController, CaptureControllerBuilder, CaptureDevice, ChunkSink, MediaStream,
    PreviewSink, Recorder, RecordingState,
};
pub use client::SubmissionClient;
pub use config::{PosecamConfig, StagingNaming};
pub use error::{PosecamError, Result};
pub use events::{EventBus, NotificationLevel, SessionEvent};
pub use media::{MediaSource, SourceKind, UploadedFile};
pub use presenter::{present, AngleReading, Presentation, ProcessedVideo};
pub use relay::{RelayServer, RelayServerBuilder};
pub use session::PoseSession;
pub use source::SourceSelector;
