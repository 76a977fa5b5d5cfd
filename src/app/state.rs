// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::types::{
    CameraDevice, CameraFrame, DeviceResolution, FlashMode, PermissionStatus, SnapshotOptions,
};
use crate::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Camera permission state.
///
/// Set exactly once by the startup permission request; never re-requested
/// during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Request not answered yet
    #[default]
    Unknown,
    /// User granted camera access
    Authorized,
    /// User denied camera access
    Denied,
}

impl PermissionState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, PermissionState::Authorized)
    }
}

impl From<PermissionStatus> for PermissionState {
    fn from(status: PermissionStatus) -> Self {
        match status {
            PermissionStatus::Authorized => PermissionState::Authorized,
            PermissionStatus::Denied => PermissionState::Denied,
        }
    }
}

/// Demo modes selectable from the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DemoMode {
    #[default]
    TakePhoto,
    RecordVideo,
    TakeSnapshot,
    CodeScanner,
}

impl DemoMode {
    /// All modes, in picker order
    pub const ALL: [DemoMode; 4] = [
        DemoMode::TakePhoto,
        DemoMode::RecordVideo,
        DemoMode::TakeSnapshot,
        DemoMode::CodeScanner,
    ];

    /// Label shown in the mode picker
    pub fn label(&self) -> &'static str {
        match self {
            DemoMode::TakePhoto => "Take Photo",
            DemoMode::RecordVideo => "Record Video",
            DemoMode::TakeSnapshot => "Take Snapshot",
            DemoMode::CodeScanner => "Code Scanner",
        }
    }
}

impl std::fmt::Display for DemoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Media paths produced by capture commands.
///
/// Each field is owned by its mode's capture handler. All three are cleared
/// on every mode change; at most one is meaningful at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedMedia {
    pub photo_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
}

impl CapturedMedia {
    /// Clear all media paths (called on mode change)
    pub fn clear(&mut self) {
        self.photo_path = None;
        self.snapshot_path = None;
        self.video_path = None;
    }

    /// True if no path is set
    pub fn is_empty(&self) -> bool {
        self.photo_path.is_none() && self.snapshot_path.is_none() && self.video_path.is_none()
    }
}

/// Recording state machine
///
/// Simple two-state design: either recording or not.
#[derive(Debug, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording {
        /// When recording started
        start_time: Instant,
        /// Output file path
        file_path: PathBuf,
    },
}

impl RecordingState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    /// Get the elapsed recording duration in seconds
    pub fn elapsed_secs(&self) -> u64 {
        match self {
            RecordingState::Idle => 0,
            RecordingState::Recording { start_time, .. } => start_time.elapsed().as_secs(),
        }
    }

    /// Start recording
    pub fn start(file_path: PathBuf) -> Self {
        RecordingState::Recording {
            start_time: Instant::now(),
            file_path,
        }
    }

    /// Stop recording (returns the previous state)
    pub fn stop(&mut self) -> Self {
        std::mem::replace(self, RecordingState::Idle)
    }
}

/// Kind of in-flight capture command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Photo,
    Snapshot,
    StartRecording,
    StopRecording,
}

/// Single-flight guard for capture commands.
///
/// The camera handle is one shared resource; overlapping capture commands
/// are rejected rather than queued.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum CommandState {
    #[default]
    Idle,
    Busy(CommandKind),
}

impl CommandState {
    /// Try to claim the camera for a command. Returns false if busy.
    pub fn try_begin(&mut self, kind: CommandKind) -> bool {
        match self {
            CommandState::Idle => {
                *self = CommandState::Busy(kind);
                true
            }
            CommandState::Busy(_) => false,
        }
    }

    /// Release the camera after a command finished or failed
    pub fn finish(&mut self) {
        *self = CommandState::Idle;
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, CommandState::Busy(_))
    }
}

/// The preview sub-view selected by the current state.
///
/// `Blank` and `Loading` mount no preview; each other variant mounts exactly
/// one preview configuration on the device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewView {
    /// Nothing rendered (permission denied, or no camera exists)
    Blank,
    /// Loading indicator (permission or device resolution pending)
    Loading,
    /// Photo capture preview
    Photo,
    /// Video recording preview
    Video,
    /// Snapshot capture preview
    Snapshot,
    /// Code scanner preview with frame processor attached
    Scanner,
}

impl PreviewView {
    /// True if this view mounts a preview configuration on the device
    pub fn is_mounted(&self) -> bool {
        !matches!(self, PreviewView::Blank | PreviewView::Loading)
    }
}

/// The application model stores the screen state and drives its logic
pub struct AppModel {
    /// Configuration loaded at startup
    pub config: Config,
    /// Camera permission state
    pub permission: PermissionState,
    /// Rear device resolution state
    pub device: DeviceResolution,
    /// Current demo mode
    pub mode: DemoMode,
    /// Whether the mode picker dropdown is open
    pub picker_open: bool,
    /// Highlighted option while the picker is open
    pub picker_index: usize,
    /// Captured media paths for the active mode
    pub media: CapturedMedia,
    /// Recording state (idle or recording)
    pub recording: RecordingState,
    /// Single-flight capture command guard
    pub command_state: CommandState,
    /// Latest preview frame
    pub current_frame: Option<Arc<CameraFrame>>,
}

/// Messages emitted by the application and its async tasks
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Permission & Device =====
    /// Startup permission request answered
    PermissionResolved(PermissionStatus),
    /// Device enumeration completed
    DevicesResolved(Vec<CameraDevice>),
    /// Enumeration did not answer in time; treat the device as absent
    DeviceResolveTimeout,

    // ===== Mode Selection =====
    /// Toggle the mode picker dropdown
    TogglePicker,
    /// Close the mode picker without changing the mode
    ClosePicker,
    /// Move the picker highlight
    PickerHighlight(usize),
    /// Select a mode (clears media paths, closes the picker)
    SelectMode(DemoMode),

    // ===== Preview =====
    /// New preview frame received from the backend
    CameraFrame(Arc<CameraFrame>),

    // ===== Capture Operations =====
    /// Capture a photo in the current mode's configuration
    TakePhoto,
    /// Photo was saved (or failed) with the resulting path
    PhotoSaved(Result<PathBuf, String>),
    /// Capture a snapshot from the preview stream
    TakeSnapshot,
    /// Snapshot was saved (or failed) with the resulting path
    SnapshotSaved(Result<PathBuf, String>),
    /// Start or stop video recording
    ToggleRecording,
    /// Recording started successfully
    RecordingStarted(PathBuf),
    /// Recording stopped; carries the finished file path
    RecordingStopped(Result<PathBuf, String>),
}

/// Side effects requested by `update`.
///
/// The runtime executes these against the camera backend and feeds results
/// back as messages. Handlers never touch the backend directly, which keeps
/// the state machine synchronous and testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue the one startup permission request
    RequestPermission,
    /// Enumerate camera devices
    ResolveDevices,
    /// Initialize the backend with the resolved rear device
    InitializeDevice(CameraDevice),
    /// Capture a full-resolution photo
    CapturePhoto { flash: FlashMode },
    /// Encode and save a preview frame as a snapshot
    EncodeSnapshot {
        frame: FrameRef,
        options: SnapshotOptions,
    },
    /// Start recording to the given path
    StartRecording { path: PathBuf, flash: FlashMode },
    /// Stop the active recording
    StopRecording,
    /// Attach the frame processor (scanner mode entered)
    StartScanner,
    /// Detach the frame processor (scanner mode left)
    StopScanner,
}

/// Frame handle carried inside [`Command`].
///
/// Wraps the Arc so `Command` can derive `PartialEq` for tests; frames
/// compare by identity, which is what a test cares about.
#[derive(Debug, Clone)]
pub struct FrameRef(pub Arc<CameraFrame>);

impl PartialEq for FrameRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FrameRef {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_state_roundtrip() {
        let mut state = RecordingState::start(PathBuf::from("/tmp/clip.rec"));
        assert!(state.is_recording());

        let stopped = state.stop();
        assert!(!state.is_recording());
        assert!(stopped.is_recording());
    }

    #[test]
    fn command_state_is_single_flight() {
        let mut state = CommandState::default();
        assert!(state.try_begin(CommandKind::Photo));
        assert!(!state.try_begin(CommandKind::Snapshot));
        assert!(state.is_busy());

        state.finish();
        assert!(state.try_begin(CommandKind::Snapshot));
    }

    #[test]
    fn captured_media_clear() {
        let mut media = CapturedMedia {
            photo_path: Some(PathBuf::from("/tmp/a.jpg")),
            ..Default::default()
        };
        assert!(!media.is_empty());
        media.clear();
        assert!(media.is_empty());
    }

    #[test]
    fn mode_labels_are_distinct() {
        let mut labels: Vec<_> = DemoMode::ALL.iter().map(|m| m.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DemoMode::ALL.len());
    }
}
