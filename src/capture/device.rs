use crate::error::CameraError;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

/// Source of live camera streams
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request a video-only stream; fails when access is denied or no camera exists
    async fn open_video_stream(&self) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// A live camera stream
#[async_trait]
pub trait MediaStream: Send {
    fn id(&self) -> &str;

    /// Attach a new recorder; every call yields an independent chunk sequence
    async fn start_recorder(&mut self) -> Result<Recorder, CameraError>;

    /// Stop every track of the stream
    fn stop_tracks(&mut self);
}

/// Target that renders the live preview
pub trait PreviewSink: Send + Sync {
    fn bind(&self, stream_id: &str);
    fn unbind(&self);
}

/// Producer half handed to the device while a recording runs
pub struct ChunkSink {
    chunks: mpsc::UnboundedSender<Bytes>,
    stop: oneshot::Receiver<()>,
}

impl ChunkSink {
    /// Deliver an encoded chunk; false once the recorder is gone
    pub fn push(&self, chunk: Bytes) -> bool {
        self.chunks.send(chunk).is_ok()
    }

    pub fn split(self) -> (mpsc::UnboundedSender<Bytes>, oneshot::Receiver<()>) {
        (self.chunks, self.stop)
    }
}

/// Consumer half: buffers chunks until `finish` materializes the blob.
///
/// The device must drop its `ChunkSink` (or the sender half) after the stop
/// signal, otherwise `finish` keeps waiting for more chunks.
pub struct Recorder {
    chunks: mpsc::UnboundedReceiver<Bytes>,
    stop: Option<oneshot::Sender<()>>,
}

impl Recorder {
    pub fn channel() -> (ChunkSink, Recorder) {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        (
            ChunkSink {
                chunks: chunk_tx,
                stop: stop_rx,
            },
            Recorder {
                chunks: chunk_rx,
                stop: Some(stop_tx),
            },
        )
    }

    /// Signal stop and drain every chunk, in arrival order, into one buffer
    pub async fn finish(mut self) -> Bytes {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        let mut buffer = BytesMut::new();
        let mut chunk_count = 0usize;

        while let Some(chunk) = self.chunks.recv().await {
            if chunk.is_empty() {
                trace!("Skipping empty recorder chunk");
                continue;
            }
            chunk_count += 1;
            buffer.extend_from_slice(&chunk);
        }

        debug!(
            "Recorder finalized {} chunks into {} bytes",
            chunk_count,
            buffer.len()
        );

        buffer.freeze()
    }
}
