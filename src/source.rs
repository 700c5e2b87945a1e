use crate::media::{MediaSource, SourceKind, UploadedFile};
use tracing::debug;

/// Tracks the latest recorded and uploaded videos and picks the newest one
#[derive(Debug, Default)]
pub struct SourceSelector {
    last_recorded: Option<(u64, MediaSource)>,
    last_uploaded: Option<(u64, MediaSource)>,
    sequence: u64,
}

impl SourceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any user-selected file as the uploaded candidate.
    /// Container and codec checks are left to the analysis engine.
    pub fn handle_upload(&mut self, file: UploadedFile) -> &MediaSource {
        self.register(MediaSource::uploaded(file))
    }

    /// Replace the candidate of the source's kind
    pub fn register(&mut self, source: MediaSource) -> &MediaSource {
        self.sequence += 1;
        debug!(
            "Registered {} source #{} ({} bytes, {})",
            source.kind(),
            self.sequence,
            source.len(),
            source.mime_type()
        );

        let slot = match source.kind() {
            SourceKind::Recorded => &mut self.last_recorded,
            SourceKind::Uploaded => &mut self.last_uploaded,
        };
        &slot.insert((self.sequence, source)).1
    }

    /// Most recently produced source, if any
    pub fn active_source(&self) -> Option<&MediaSource> {
        match (&self.last_recorded, &self.last_uploaded) {
            (Some((recorded_seq, recorded)), Some((uploaded_seq, uploaded))) => {
                if recorded_seq > uploaded_seq {
                    Some(recorded)
                } else {
                    Some(uploaded)
                }
            }
            (Some((_, recorded)), None) => Some(recorded),
            (None, Some((_, uploaded))) => Some(uploaded),
            (None, None) => None,
        }
    }

    pub fn last_of(&self, kind: SourceKind) -> Option<&MediaSource> {
        match kind {
            SourceKind::Recorded => self.last_recorded.as_ref().map(|(_, s)| s),
            SourceKind::Uploaded => self.last_uploaded.as_ref().map(|(_, s)| s),
        }
    }

    pub fn clear(&mut self) {
        self.last_recorded = None;
        self.last_uploaded = None;
    }
}
