mod builder;
mod controller;
mod device;
pub mod mock;
#[cfg(test)]
mod tests;

pub use builder::CaptureControllerBuilder;
pub use controller::{CaptureController, RecordingState};
pub use device::{CaptureDevice, ChunkSink, MediaStream, PreviewSink, Recorder};
