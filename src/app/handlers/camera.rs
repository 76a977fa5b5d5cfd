// SPDX-License-Identifier: GPL-3.0-only

//! Permission, device resolution, and preview frame handlers

use crate::app::state::{AppModel, Command, PermissionState};
use crate::backends::types::{
    CameraDevice, CameraFrame, CameraPosition, DeviceResolution, PermissionStatus,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl AppModel {
    /// Store the result of the one startup permission request.
    ///
    /// A denied result renders a blank body; there is no retry and no
    /// denial-recovery UI.
    pub(crate) fn handle_permission_resolved(&mut self, status: PermissionStatus) -> Vec<Command> {
        if self.permission != PermissionState::Unknown {
            warn!(?status, "Duplicate permission result ignored");
            return Vec::new();
        }
        self.permission = status.into();
        info!(state = ?self.permission, "Camera permission resolved");

        match (self.permission, self.device.device()) {
            // Device already resolved while the prompt was open
            (PermissionState::Authorized, Some(device)) => {
                let mut commands = vec![Command::InitializeDevice(device.clone())];
                commands.extend(self.scanner_command_for_current_mode());
                commands
            }
            _ => Vec::new(),
        }
    }

    /// Map enumeration output onto the tri-state resolver: first rear
    /// device wins, anything else means the rear camera is absent.
    pub(crate) fn handle_devices_resolved(&mut self, devices: Vec<CameraDevice>) -> Vec<Command> {
        if !self.device.is_pending() {
            debug!("Device resolution already settled, ignoring late enumeration");
            return Vec::new();
        }

        let rear = devices
            .into_iter()
            .find(|d| d.position == CameraPosition::Back);

        match rear {
            Some(device) => {
                info!(name = %device.name, "Rear camera resolved");
                self.device = DeviceResolution::Found(device.clone());
                if self.is_authorized() {
                    let mut commands = vec![Command::InitializeDevice(device)];
                    commands.extend(self.scanner_command_for_current_mode());
                    return commands;
                }
                Vec::new()
            }
            None => {
                warn!("No rear camera device found");
                self.device = DeviceResolution::Absent;
                Vec::new()
            }
        }
    }

    /// Enumeration never answered; settle on `Absent` so the screen does
    /// not show a loading indicator forever.
    pub(crate) fn handle_device_resolve_timeout(&mut self) -> Vec<Command> {
        if self.device.is_pending() {
            warn!("Device enumeration timed out, treating rear camera as absent");
            self.device = DeviceResolution::Absent;
        }
        Vec::new()
    }

    /// Store the latest preview frame
    pub(crate) fn handle_camera_frame(&mut self, frame: Arc<CameraFrame>) -> Vec<Command> {
        self.current_frame = Some(frame);
        Vec::new()
    }

    /// Scanner attachment for the mode active at initialization time.
    ///
    /// Normally the scanner starts on mode switch, but when the app starts
    /// directly in scanner mode the attachment has to come from here.
    fn scanner_command_for_current_mode(&self) -> Option<Command> {
        use crate::app::state::DemoMode;
        (self.mode == DemoMode::CodeScanner).then_some(Command::StartScanner)
    }
}
