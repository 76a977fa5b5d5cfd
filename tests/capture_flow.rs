// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end capture tests over the simulated backend
//!
//! Exercises the backend trait the way the runtime does: initialize,
//! stream preview frames, capture and save media, record and finalize.

use camera_demo::FrameProcessor;
use camera_demo::backends::simulated::SimulatedBackend;
use camera_demo::backends::types::{CameraPosition, FlashMode, PermissionStatus};
use camera_demo::backends::CameraBackend;
use camera_demo::scanner::QrDetector;
use camera_demo::storage;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

fn initialized_backend() -> SimulatedBackend {
    let mut backend = SimulatedBackend::new();
    assert_eq!(backend.request_permission(), PermissionStatus::Authorized);
    let device = backend
        .enumerate_devices()
        .into_iter()
        .find(|d| d.position == CameraPosition::Back)
        .expect("simulated rear device");
    backend.initialize(&device).unwrap();
    backend
}

#[tokio::test]
async fn preview_stream_delivers_frames() {
    let mut backend = initialized_backend();
    let mut frames = backend.take_frame_receiver().expect("frame receiver");

    let frame = tokio::time::timeout(Duration::from_secs(2), frames.next())
        .await
        .expect("frame within timeout")
        .expect("producer running");
    assert!(frame.width > 0 && frame.height > 0);

    // The receiver can only be taken once per initialization
    assert!(backend.take_frame_receiver().is_none());
    backend.shutdown().unwrap();
}

#[test]
fn photo_capture_saves_a_decodable_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("IMG_test.jpg");

    let mut backend = initialized_backend();
    let frame = backend.capture_photo(FlashMode::Off).unwrap();
    storage::save_photo(&frame, &path).unwrap();

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.width(), frame.width);
    assert_eq!(decoded.height(), frame.height);
    backend.shutdown().unwrap();
}

#[test]
fn recording_finalizes_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("VID_test.rec");

    let mut backend = initialized_backend();
    backend.start_recording(path.clone(), FlashMode::Off).unwrap();

    // Quitting mid-recording must not lose the file
    backend.shutdown().unwrap();
    assert!(!backend.is_recording());
    assert!(path.exists());
}

#[tokio::test]
async fn scanner_publishes_nothing_for_the_test_pattern() {
    let mut backend = initialized_backend();
    let mut frames = backend.take_frame_receiver().expect("frame receiver");

    let mut processor =
        FrameProcessor::with_interval(Arc::new(QrDetector::new()), Duration::ZERO);
    let rx = processor.subscribe();

    let frame = tokio::time::timeout(Duration::from_secs(2), frames.next())
        .await
        .expect("frame within timeout")
        .expect("producer running");
    processor.pass_async(frame).await;

    // The gradient pattern holds no QR code; the cell stays empty
    assert_eq!(*rx.borrow(), "");
    backend.shutdown().unwrap();
}
