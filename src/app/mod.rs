// SPDX-License-Identifier: GPL-3.0-only

//! Application logic: state machine, message handlers, and frame processing

pub mod frame_processor;
pub mod handlers;
pub mod state;
pub mod update;

pub use state::{
    AppModel, CapturedMedia, Command, CommandKind, CommandState, DemoMode, FrameRef, Message,
    PermissionState, PreviewView, RecordingState,
};

use crate::backends::types::DeviceResolution;
use crate::config::Config;

impl AppModel {
    /// Create the model and the startup commands.
    ///
    /// The permission request and device enumeration are both issued once,
    /// here; neither is ever retried.
    pub fn new(config: Config) -> (Self, Vec<Command>) {
        let mode = config.default_mode;
        let model = Self {
            config,
            permission: PermissionState::Unknown,
            device: DeviceResolution::Pending,
            mode,
            picker_open: false,
            picker_index: 0,
            media: CapturedMedia::default(),
            recording: RecordingState::Idle,
            command_state: CommandState::Idle,
            current_frame: None,
        };
        (
            model,
            vec![Command::RequestPermission, Command::ResolveDevices],
        )
    }

    /// Whether the permission gate has opened
    pub fn is_authorized(&self) -> bool {
        self.permission.is_authorized()
    }

    /// Map the current state to the single preview sub-view to mount.
    ///
    /// Pure selection: any mode is reachable from any mode, and the mapping
    /// depends only on permission, device resolution, and the current mode.
    pub fn active_view(&self) -> PreviewView {
        match self.permission {
            PermissionState::Denied => return PreviewView::Blank,
            PermissionState::Unknown => return PreviewView::Loading,
            PermissionState::Authorized => {}
        }

        match &self.device {
            DeviceResolution::Pending => PreviewView::Loading,
            DeviceResolution::Absent => PreviewView::Blank,
            DeviceResolution::Found(_) => match self.mode {
                DemoMode::TakePhoto => PreviewView::Photo,
                DemoMode::RecordVideo => PreviewView::Video,
                DemoMode::TakeSnapshot => PreviewView::Snapshot,
                DemoMode::CodeScanner => PreviewView::Scanner,
            },
        }
    }
}
