use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosecamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Presentation error: {0}")]
    Present(#[from] PresentError),

    #[error("System error: {message}")]
    System { message: String },
}

impl PosecamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Camera acquisition and recording failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Camera access denied: {details}")]
    PermissionDenied { details: String },

    #[error("No camera available: {details}")]
    Unavailable { details: String },

    #[error("Recorder failure: {details}")]
    Recorder { details: String },
}

/// Failures inside the relay service
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Bad request: {details}")]
    BadRequest { details: String },

    #[error("Failed to stage upload at {path}: {source}")]
    Staging {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Analysis engine unreachable at {url}: {source}")]
    EngineUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Analysis engine returned HTTP {status}: {body}")]
    EngineStatus { status: u16, body: String },

    #[error("Analysis engine did not answer within {seconds}s")]
    EngineTimeout { seconds: u64 },

    #[error("Analysis engine returned an invalid body: {details}")]
    InvalidEngineResponse { details: String },

    #[error("Failed to bind relay to {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Relay startup failed: {details}")]
    StartupFailed { details: String },
}

/// Failures between the client and the relay
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Failed to reach relay: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Relay did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Relay rejected the analysis (HTTP {status}){}", message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    #[error("Relay returned an unreadable result: {details}")]
    InvalidResponse { details: String },
}

/// Failures turning an analysis result into displayable media
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresentError {
    #[error("Processed video is not valid base64: {details}")]
    InvalidVideo { details: String },
}

pub type Result<T> = std::result::Result<T, PosecamError>;

/// Event bus delivery failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}
