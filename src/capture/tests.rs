use super::mock::{MockCaptureDevice, MockFeed, MockPreview};
use super::*;
use crate::error::{CameraError, PosecamError};
use crate::media::SourceKind;
use bytes::Bytes;
use std::sync::Arc;

fn create_test_controller() -> (CaptureController, MockFeed, Arc<MockPreview>) {
    let device = Arc::new(MockCaptureDevice::new());
    let feed = device.feed();
    let preview = Arc::new(MockPreview::default());

    let controller = CaptureControllerBuilder::new()
        .device(device)
        .preview(preview.clone())
        .build()
        .unwrap();

    (controller, feed, preview)
}

#[tokio::test]
async fn test_acquire_camera_binds_preview() {
    let (mut controller, feed, preview) = create_test_controller();
    assert_eq!(controller.state(), RecordingState::Idle);

    controller.acquire_camera().await.unwrap();

    assert_eq!(controller.state(), RecordingState::CameraActive);
    assert_eq!(preview.bound_stream().as_deref(), Some("mock-stream-1"));
    assert!(feed.tracks_live());

    // A second acquire keeps the same stream
    controller.acquire_camera().await.unwrap();
    assert_eq!(feed.streams_opened(), 1);
}

#[tokio::test]
async fn test_camera_denied_stays_idle() {
    let device = Arc::new(MockCaptureDevice::denying(CameraError::PermissionDenied {
        details: "user dismissed prompt".to_string(),
    }));
    let mut controller = CaptureController::new(device.clone(), None);

    let result = controller.acquire_camera().await;
    assert!(matches!(result, Err(CameraError::PermissionDenied { .. })));
    assert_eq!(controller.state(), RecordingState::Idle);

    // Retrying after the user grants access works
    device.allow();
    controller.acquire_camera().await.unwrap();
    assert_eq!(controller.state(), RecordingState::CameraActive);
}

#[tokio::test]
async fn test_release_camera_stops_tracks() {
    let (mut controller, feed, preview) = create_test_controller();

    // No-op while idle
    controller.release_camera();
    assert_eq!(controller.state(), RecordingState::Idle);

    controller.acquire_camera().await.unwrap();
    controller.release_camera();

    assert_eq!(controller.state(), RecordingState::Idle);
    assert!(!feed.tracks_live());
    assert!(preview.bound_stream().is_none());
}

#[tokio::test]
async fn test_start_recording_only_from_camera_active() {
    let (mut controller, _feed, _preview) = create_test_controller();

    assert!(!controller.start_recording().await.unwrap());
    assert_eq!(controller.state(), RecordingState::Idle);

    controller.acquire_camera().await.unwrap();
    assert!(controller.start_recording().await.unwrap());
    assert_eq!(controller.state(), RecordingState::Recording);

    // Already recording: ignored
    assert!(!controller.start_recording().await.unwrap());
    assert_eq!(controller.state(), RecordingState::Recording);

    controller.release_camera();
    assert!(!controller.start_recording().await.unwrap());
    assert_eq!(controller.state(), RecordingState::Idle);
}

#[tokio::test]
async fn test_stop_recording_concatenates_chunks_in_order() {
    let (mut controller, feed, _preview) = create_test_controller();

    assert!(controller.stop_recording().await.is_none());

    controller.acquire_camera().await.unwrap();
    controller.start_recording().await.unwrap();

    assert!(feed.push(Bytes::from_static(b"ab")));
    assert!(feed.push(Bytes::new()));
    assert!(feed.push(Bytes::from_static(b"cd")));
    assert!(feed.push(Bytes::from_static(b"e")));

    let source = controller.stop_recording().await.unwrap();

    assert_eq!(source.kind(), SourceKind::Recorded);
    assert_eq!(source.mime_type(), "video/mp4");
    assert_eq!(source.data().as_ref(), b"abcde");
    assert_eq!(controller.state(), RecordingState::Stopped);
    assert!(controller.is_camera_active());
    assert!(!feed.is_recording());
}

#[tokio::test]
async fn test_sequential_recordings_are_independent() {
    let (mut controller, feed, _preview) = create_test_controller();
    controller.acquire_camera().await.unwrap();

    controller.start_recording().await.unwrap();
    feed.push(Bytes::from_static(b"first"));
    let first = controller.stop_recording().await.unwrap();

    // Nothing is listening between recordings
    assert!(!feed.push(Bytes::from_static(b"lost")));

    assert!(controller.start_recording().await.unwrap());
    feed.push(Bytes::from_static(b"sec"));
    feed.push(Bytes::from_static(b"ond"));
    let second = controller.stop_recording().await.unwrap();

    assert_eq!(first.data().as_ref(), b"first");
    assert_eq!(second.data().as_ref(), b"second");
}

#[tokio::test]
async fn test_release_while_recording_discards_partial_blob() {
    let (mut controller, feed, _preview) = create_test_controller();
    controller.acquire_camera().await.unwrap();
    controller.start_recording().await.unwrap();
    feed.push(Bytes::from_static(b"partial"));

    controller.release_camera();

    assert_eq!(controller.state(), RecordingState::Idle);
    assert!(controller.stop_recording().await.is_none());
}

#[tokio::test]
async fn test_builder_validation() {
    let result = CaptureControllerBuilder::new().build();

    match result {
        Err(PosecamError::System { message }) => {
            assert!(message.contains("Capture device must be specified"));
        }
        _ => panic!("Expected system error for missing device"),
    }
}

#[tokio::test]
async fn test_recorder_finish_waits_for_device_flush() {
    let (sink, recorder) = Recorder::channel();
    let (chunks, stop) = sink.split();

    let device = tokio::spawn(async move {
        chunks.send(Bytes::from_static(b"head")).unwrap();
        stop.await.unwrap();
        // Final chunk delivered after the stop request still counts
        chunks.send(Bytes::from_static(b"tail")).unwrap();
    });

    let blob = recorder.finish().await;
    device.await.unwrap();

    assert_eq!(blob.as_ref(), b"headtail");
}

#[tokio::test]
async fn test_chunk_sink_push_reports_closed_recorder() {
    let (sink, recorder) = Recorder::channel();

    assert!(sink.push(Bytes::from_static(b"a")));
    drop(recorder);
    assert!(!sink.push(Bytes::from_static(b"b")));
}
