use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// MIME type given to finalized recordings
pub const RECORDING_MIME_TYPE: &str = "video/mp4";

/// Fallback MIME type for uploads whose type is unknown
pub const DEFAULT_UPLOAD_MIME_TYPE: &str = "application/octet-stream";

/// Where a media blob came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Recorded,
    Uploaded,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Recorded => write!(f, "recorded"),
            SourceKind::Uploaded => write!(f, "uploaded"),
        }
    }
}

/// A video blob that can be submitted for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    kind: SourceKind,
    data: Bytes,
    mime_type: String,
    file_name: Option<String>,
    produced_at: DateTime<Utc>,
}

impl MediaSource {
    /// Wrap a finalized recording
    pub fn recorded(data: Bytes) -> Self {
        Self {
            kind: SourceKind::Recorded,
            data,
            mime_type: RECORDING_MIME_TYPE.to_string(),
            file_name: None,
            produced_at: Utc::now(),
        }
    }

    /// Wrap a user-selected file
    pub fn uploaded(file: UploadedFile) -> Self {
        Self {
            kind: SourceKind::Uploaded,
            data: file.data,
            mime_type: file.mime_type,
            file_name: Some(file.name),
            produced_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn produced_at(&self) -> DateTime<Utc> {
        self.produced_at
    }
}

/// A file picked by the user, not yet validated in any way
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new<N: Into<String>, M: Into<String>>(name: N, mime_type: M, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Build an upload from a path, guessing the MIME type from the extension
    pub async fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());

        Ok(Self::new(name, guess_video_mime(path), Bytes::from(data)))
    }
}

/// Map common video extensions to MIME types
pub fn guess_video_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => DEFAULT_UPLOAD_MIME_TYPE,
    }
}
