// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher; the handling code
//! lives in the `handlers` submodules organized by functional domain:
//!
//! - `handlers::camera`: permission, device resolution, preview frames
//! - `handlers::mode`: mode picker and mode selection
//! - `handlers::capture`: photo, snapshot, and recording commands

use crate::app::state::{AppModel, Command, Message};

impl AppModel {
    /// Main message handler - routes messages to the handler methods.
    ///
    /// Returns the side effects the runtime must execute. State mutation
    /// happens synchronously here; anything touching the backend or the
    /// filesystem is returned as a [`Command`].
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            // ===== Permission & Device =====
            Message::PermissionResolved(status) => self.handle_permission_resolved(status),
            Message::DevicesResolved(devices) => self.handle_devices_resolved(devices),
            Message::DeviceResolveTimeout => self.handle_device_resolve_timeout(),

            // ===== Mode Selection =====
            Message::TogglePicker => self.handle_toggle_picker(),
            Message::ClosePicker => self.handle_close_picker(),
            Message::PickerHighlight(index) => self.handle_picker_highlight(index),
            Message::SelectMode(mode) => self.handle_select_mode(mode),

            // ===== Preview =====
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),

            // ===== Capture Operations =====
            Message::TakePhoto => self.handle_take_photo(),
            Message::PhotoSaved(result) => self.handle_photo_saved(result),
            Message::TakeSnapshot => self.handle_take_snapshot(),
            Message::SnapshotSaved(result) => self.handle_snapshot_saved(result),
            Message::ToggleRecording => self.handle_toggle_recording(),
            Message::RecordingStarted(path) => self.handle_recording_started(path),
            Message::RecordingStopped(result) => self.handle_recording_stopped(result),
        }
    }
}
