use super::device::{CaptureDevice, MediaStream, PreviewSink, Recorder};
use crate::error::CameraError;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Default)]
struct FeedSlot {
    generation: u64,
    sender: Option<mpsc::UnboundedSender<Bytes>>,
}

/// Handle used to push encoded chunks into whatever mock recorder is running
#[derive(Clone, Default)]
pub struct MockFeed {
    slot: Arc<Mutex<FeedSlot>>,
    live_tracks: Arc<AtomicBool>,
    streams_opened: Arc<AtomicU64>,
}

impl MockFeed {
    /// Push a chunk; returns false when no recorder is attached
    pub fn push(&self, chunk: impl Into<Bytes>) -> bool {
        let slot = self.slot.lock();
        match &slot.sender {
            Some(sender) => sender.send(chunk.into()).is_ok(),
            None => false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.slot.lock().sender.is_some()
    }

    pub fn tracks_live(&self) -> bool {
        self.live_tracks.load(Ordering::SeqCst)
    }

    pub fn streams_opened(&self) -> u64 {
        self.streams_opened.load(Ordering::SeqCst)
    }

    fn install(&self, sender: mpsc::UnboundedSender<Bytes>) -> u64 {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.sender = Some(sender);
        slot.generation
    }

    fn close(&self, generation: u64) {
        let mut slot = self.slot.lock();
        if slot.generation == generation {
            slot.sender = None;
        }
    }

    fn close_all(&self) {
        self.slot.lock().sender = None;
    }
}

/// Camera stand-in for tests and hosts without capture hardware
pub struct MockCaptureDevice {
    feed: MockFeed,
    denial: Mutex<Option<CameraError>>,
}

impl MockCaptureDevice {
    pub fn new() -> Self {
        Self {
            feed: MockFeed::default(),
            denial: Mutex::new(None),
        }
    }

    /// A device whose every open request fails with `error`
    pub fn denying(error: CameraError) -> Self {
        let device = Self::new();
        *device.denial.lock() = Some(error);
        device
    }

    pub fn feed(&self) -> MockFeed {
        self.feed.clone()
    }

    pub fn allow(&self) {
        *self.denial.lock() = None;
    }
}

impl Default for MockCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for MockCaptureDevice {
    async fn open_video_stream(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        if let Some(error) = self.denial.lock().clone() {
            return Err(error);
        }

        let number = self.feed.streams_opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.feed.live_tracks.store(true, Ordering::SeqCst);

        Ok(Box::new(MockMediaStream {
            id: format!("mock-stream-{}", number),
            feed: self.feed.clone(),
        }))
    }
}

struct MockMediaStream {
    id: String,
    feed: MockFeed,
}

#[async_trait]
impl MediaStream for MockMediaStream {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start_recorder(&mut self) -> Result<Recorder, CameraError> {
        if !self.feed.tracks_live() {
            return Err(CameraError::Recorder {
                details: "stream tracks are stopped".to_string(),
            });
        }

        let (sink, recorder) = Recorder::channel();
        let (sender, stop) = sink.split();
        let generation = self.feed.install(sender);

        let feed = self.feed.clone();
        tokio::spawn(async move {
            // Resolves on stop or when the recorder is dropped
            let _ = stop.await;
            debug!("Mock recorder {} flushed", generation);
            feed.close(generation);
        });

        Ok(recorder)
    }

    fn stop_tracks(&mut self) {
        self.feed.live_tracks.store(false, Ordering::SeqCst);
        self.feed.close_all();
    }
}

/// Preview target that remembers which stream it shows
#[derive(Default)]
pub struct MockPreview {
    bound: Mutex<Option<String>>,
}

impl MockPreview {
    pub fn bound_stream(&self) -> Option<String> {
        self.bound.lock().clone()
    }
}

impl PreviewSink for MockPreview {
    fn bind(&self, stream_id: &str) {
        *self.bound.lock() = Some(stream_id.to_string());
    }

    fn unbind(&self) {
        *self.bound.lock() = None;
    }
}
