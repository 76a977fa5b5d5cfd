// SPDX-License-Identifier: GPL-3.0-only

//! State machine integration tests
//!
//! Drives the application model through realistic message sequences and
//! checks the emitted commands and resulting state. No backend, no UI, no
//! hardware.

use camera_demo::app::{
    AppModel, Command, DemoMode, Message, PermissionState, PreviewView,
};
use camera_demo::backends::types::{
    CameraDevice, CameraPosition, DeviceResolution, PermissionStatus,
};
use camera_demo::config::Config;
use std::path::PathBuf;

fn rear_device() -> CameraDevice {
    CameraDevice {
        name: "Test Rear Camera".to_string(),
        path: "test:0".to_string(),
        position: CameraPosition::Back,
    }
}

fn front_device() -> CameraDevice {
    CameraDevice {
        name: "Test Front Camera".to_string(),
        path: "test:1".to_string(),
        position: CameraPosition::Front,
    }
}

/// Model with permission granted and the rear device resolved
fn ready_model(mode: DemoMode) -> AppModel {
    let config = Config {
        default_mode: mode,
        ..Config::default()
    };
    let (mut model, startup) = AppModel::new(config);
    assert_eq!(
        startup,
        vec![Command::RequestPermission, Command::ResolveDevices]
    );
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    model.update(Message::DevicesResolved(vec![front_device(), rear_device()]));
    model
}

#[test]
fn startup_resolves_permission_and_rear_device() {
    let model = ready_model(DemoMode::TakePhoto);
    assert_eq!(model.permission, PermissionState::Authorized);
    assert!(matches!(model.device, DeviceResolution::Found(ref d) if d.position == CameraPosition::Back));
    assert_eq!(model.active_view(), PreviewView::Photo);
}

#[test]
fn device_resolution_initializes_backend_once_authorized() {
    let (mut model, _) = AppModel::new(Config::default());
    // Enumeration answers before the permission prompt
    let commands = model.update(Message::DevicesResolved(vec![rear_device()]));
    assert!(commands.is_empty(), "no init before permission");

    let commands = model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    assert_eq!(commands, vec![Command::InitializeDevice(rear_device())]);
}

#[test]
fn denied_permission_renders_blank_and_never_retries() {
    let (mut model, _) = AppModel::new(Config::default());
    let commands = model.update(Message::PermissionResolved(PermissionStatus::Denied));
    assert!(commands.is_empty());
    assert_eq!(model.active_view(), PreviewView::Blank);

    // Capture input is inert; nothing crashes, nothing is emitted
    assert!(model.update(Message::TakePhoto).is_empty());
    assert!(model.update(Message::TakeSnapshot).is_empty());
    assert!(model.update(Message::ToggleRecording).is_empty());

    // A second (spurious) permission result does not reopen the gate
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    assert_eq!(model.permission, PermissionState::Denied);
}

#[test]
fn missing_rear_camera_renders_blank() {
    let (mut model, _) = AppModel::new(Config::default());
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    model.update(Message::DevicesResolved(vec![front_device()]));
    assert_eq!(model.device, DeviceResolution::Absent);
    assert_eq!(model.active_view(), PreviewView::Blank);
}

#[test]
fn enumeration_timeout_settles_on_absent() {
    let (mut model, _) = AppModel::new(Config::default());
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    assert_eq!(model.active_view(), PreviewView::Loading);

    model.update(Message::DeviceResolveTimeout);
    assert_eq!(model.device, DeviceResolution::Absent);
    assert_eq!(model.active_view(), PreviewView::Blank);

    // Late enumeration after the timeout is ignored
    model.update(Message::DevicesResolved(vec![rear_device()]));
    assert_eq!(model.device, DeviceResolution::Absent);
}

#[test]
fn exactly_one_view_per_mode() {
    for (mode, expected) in [
        (DemoMode::TakePhoto, PreviewView::Photo),
        (DemoMode::RecordVideo, PreviewView::Video),
        (DemoMode::TakeSnapshot, PreviewView::Snapshot),
        (DemoMode::CodeScanner, PreviewView::Scanner),
    ] {
        let model = ready_model(mode);
        assert_eq!(model.active_view(), expected);
    }
}

#[test]
fn mode_switch_clears_all_media_paths() {
    let mut model = ready_model(DemoMode::TakePhoto);
    model.update(Message::TakePhoto);
    model.update(Message::PhotoSaved(Ok(PathBuf::from("/tmp/a.jpg"))));
    assert!(model.media.photo_path.is_some());

    model.update(Message::SelectMode(DemoMode::TakeSnapshot));
    assert!(model.media.is_empty());
    assert_eq!(model.mode, DemoMode::TakeSnapshot);
}

#[test]
fn selecting_the_current_mode_is_a_no_op() {
    let mut model = ready_model(DemoMode::TakePhoto);
    model.update(Message::TakePhoto);
    model.update(Message::PhotoSaved(Ok(PathBuf::from("/tmp/a.jpg"))));

    let commands = model.update(Message::SelectMode(DemoMode::TakePhoto));
    assert!(commands.is_empty());
    // Re-selecting does not clear the captured path
    assert!(model.media.photo_path.is_some());
}

#[test]
fn picker_opens_on_current_mode_and_closes_on_selection() {
    let mut model = ready_model(DemoMode::TakeSnapshot);
    model.update(Message::TogglePicker);
    assert!(model.picker_open);
    assert_eq!(DemoMode::ALL[model.picker_index], DemoMode::TakeSnapshot);

    model.update(Message::PickerHighlight(3));
    model.update(Message::SelectMode(DemoMode::ALL[model.picker_index]));
    assert!(!model.picker_open);
    assert_eq!(model.mode, DemoMode::CodeScanner);
}

#[test]
fn photo_capture_roundtrip() {
    let mut model = ready_model(DemoMode::TakePhoto);

    let commands = model.update(Message::TakePhoto);
    assert!(matches!(commands.as_slice(), [Command::CapturePhoto { .. }]));

    // The guard holds until the save completes
    assert!(model.command_state.is_busy());
    assert!(model.update(Message::TakePhoto).is_empty());

    model.update(Message::PhotoSaved(Ok(PathBuf::from("/tmp/IMG_1.jpg"))));
    assert_eq!(model.media.photo_path, Some(PathBuf::from("/tmp/IMG_1.jpg")));
    assert!(!model.command_state.is_busy());
}

#[test]
fn failed_photo_leaves_paths_unchanged_and_releases_guard() {
    let mut model = ready_model(DemoMode::TakePhoto);
    model.update(Message::TakePhoto);
    model.update(Message::PhotoSaved(Err("device unavailable".to_string())));

    assert!(model.media.is_empty());
    assert!(!model.command_state.is_busy());

    // The screen stays interactive: a retry is accepted
    let commands = model.update(Message::TakePhoto);
    assert!(matches!(commands.as_slice(), [Command::CapturePhoto { .. }]));
}

#[test]
fn photo_finishing_after_mode_switch_is_discarded() {
    let mut model = ready_model(DemoMode::TakePhoto);
    model.update(Message::TakePhoto);
    model.update(Message::SelectMode(DemoMode::CodeScanner));
    model.update(Message::PhotoSaved(Ok(PathBuf::from("/tmp/late.jpg"))));
    assert!(model.media.is_empty());
}

#[test]
fn snapshot_requires_a_preview_frame() {
    let mut model = ready_model(DemoMode::TakeSnapshot);
    assert!(model.update(Message::TakeSnapshot).is_empty());

    let frame = std::sync::Arc::new(camera_demo::backends::types::CameraFrame::from_packed(
        4,
        4,
        camera_demo::backends::types::PixelFormat::RGBA,
        vec![0u8; 64],
    ));
    model.update(Message::CameraFrame(frame));

    let commands = model.update(Message::TakeSnapshot);
    assert!(matches!(commands.as_slice(), [Command::EncodeSnapshot { .. }]));

    model.update(Message::SnapshotSaved(Ok(PathBuf::from("/tmp/SNAP_1.jpg"))));
    assert_eq!(
        model.media.snapshot_path,
        Some(PathBuf::from("/tmp/SNAP_1.jpg"))
    );
}

#[test]
fn recording_start_stop_yields_video_path_exactly_once() {
    let mut model = ready_model(DemoMode::RecordVideo);

    let commands = model.update(Message::ToggleRecording);
    let [Command::StartRecording { path, .. }] = commands.as_slice() else {
        panic!("expected a start command, got {commands:?}");
    };
    let path = path.clone();

    model.update(Message::RecordingStarted(path.clone()));
    assert!(model.recording.is_recording());
    assert!(model.media.video_path.is_none());

    let commands = model.update(Message::ToggleRecording);
    assert_eq!(commands, vec![Command::StopRecording]);

    model.update(Message::RecordingStopped(Ok(path.clone())));
    assert!(!model.recording.is_recording());
    assert_eq!(model.media.video_path, Some(path));
}

#[test]
fn recording_toggle_is_rejected_while_stop_is_in_flight() {
    let mut model = ready_model(DemoMode::RecordVideo);
    model.update(Message::ToggleRecording);
    model.update(Message::RecordingStarted(PathBuf::from("/tmp/VID_1.rec")));
    model.update(Message::ToggleRecording);

    // Stop command issued but not confirmed; further toggles are rejected
    assert!(model.update(Message::ToggleRecording).is_empty());
}

#[test]
fn switching_modes_stops_an_active_recording() {
    let mut model = ready_model(DemoMode::RecordVideo);
    model.update(Message::ToggleRecording);
    model.update(Message::RecordingStarted(PathBuf::from("/tmp/VID_1.rec")));

    let commands = model.update(Message::SelectMode(DemoMode::TakePhoto));
    assert!(commands.contains(&Command::StopRecording));
    assert!(!model.recording.is_recording());

    // The late stop result belongs to the abandoned mode
    model.update(Message::RecordingStopped(Ok(PathBuf::from("/tmp/VID_1.rec"))));
    assert!(model.media.video_path.is_none());
}

#[test]
fn late_recording_stop_does_not_release_another_commands_guard() {
    let mut model = ready_model(DemoMode::RecordVideo);
    model.update(Message::ToggleRecording);
    model.update(Message::RecordingStarted(PathBuf::from("/tmp/VID_1.rec")));

    // The mode switch stops the recording without claiming the guard
    model.update(Message::SelectMode(DemoMode::TakePhoto));
    let commands = model.update(Message::TakePhoto);
    assert!(matches!(commands.as_slice(), [Command::CapturePhoto { .. }]));

    // The stop confirmation belongs to the unclaimed mode-switch stop;
    // the in-flight photo keeps its claim
    model.update(Message::RecordingStopped(Ok(PathBuf::from("/tmp/VID_1.rec"))));
    assert!(model.command_state.is_busy());
    assert!(model.update(Message::TakePhoto).is_empty());

    model.update(Message::PhotoSaved(Ok(PathBuf::from("/tmp/IMG_1.jpg"))));
    assert!(!model.command_state.is_busy());
}

#[test]
fn failed_recording_stop_only_reports() {
    let mut model = ready_model(DemoMode::RecordVideo);
    model.update(Message::ToggleRecording);
    model.update(Message::RecordingStarted(PathBuf::from("/tmp/VID_1.rec")));
    model.update(Message::ToggleRecording);
    model.update(Message::RecordingStopped(Err("disk full".to_string())));

    assert!(model.media.video_path.is_none());
    assert_eq!(model.mode, DemoMode::RecordVideo);
    assert!(!model.command_state.is_busy());
}

#[test]
fn scanner_attaches_and_detaches_on_mode_switch() {
    let mut model = ready_model(DemoMode::TakePhoto);

    let commands = model.update(Message::SelectMode(DemoMode::CodeScanner));
    assert_eq!(commands, vec![Command::StartScanner]);

    let commands = model.update(Message::SelectMode(DemoMode::RecordVideo));
    assert_eq!(commands, vec![Command::StopScanner]);
}

#[test]
fn starting_in_scanner_mode_attaches_the_processor() {
    let config = Config {
        default_mode: DemoMode::CodeScanner,
        ..Config::default()
    };
    let (mut model, _) = AppModel::new(config);
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    let commands = model.update(Message::DevicesResolved(vec![rear_device()]));
    assert_eq!(
        commands,
        vec![
            Command::InitializeDevice(rear_device()),
            Command::StartScanner
        ]
    );
}

#[test]
fn scanner_does_not_attach_without_a_device() {
    let (mut model, _) = AppModel::new(Config::default());
    model.update(Message::PermissionResolved(PermissionStatus::Authorized));
    model.update(Message::DevicesResolved(vec![]));

    // Device absent: the scanner view cannot mount, so no attachment
    let commands = model.update(Message::SelectMode(DemoMode::CodeScanner));
    assert!(!commands.contains(&Command::StartScanner));
    assert_eq!(model.active_view(), PreviewView::Blank);
}
