// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Photo, snapshot, and video recording commands. All three are
//! fire-and-forget: the handler claims the single-flight guard, emits a
//! command for the runtime, and the result comes back as a message. A
//! failure is logged and leaves every media path unchanged; the screen
//! stays interactive.

use crate::app::state::{
    AppModel, Command, CommandKind, CommandState, DemoMode, FrameRef, RecordingState,
};
use crate::backends::types::SnapshotOptions;
use crate::storage;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

impl AppModel {
    /// Capture a full-resolution photo
    pub(crate) fn handle_take_photo(&mut self) -> Vec<Command> {
        if self.mode != DemoMode::TakePhoto || !self.active_view().is_mounted() {
            debug!("Photo capture ignored outside photo mode");
            return Vec::new();
        }
        if !self.command_state.try_begin(CommandKind::Photo) {
            warn!("Camera busy, photo command rejected");
            return Vec::new();
        }

        info!(flash = %self.config.flash_mode, "Capturing photo");
        vec![Command::CapturePhoto {
            flash: self.config.flash_mode,
        }]
    }

    pub(crate) fn handle_photo_saved(&mut self, result: Result<PathBuf, String>) -> Vec<Command> {
        self.command_state.finish();
        match result {
            Ok(path) => {
                if self.mode == DemoMode::TakePhoto {
                    info!(path = %path.display(), "Photo saved");
                    self.media.photo_path = Some(path);
                } else {
                    // Mode changed while the capture was in flight; the
                    // cleared-on-switch invariant wins over the late result.
                    warn!(path = %path.display(), "Discarding photo saved after mode switch");
                }
            }
            Err(e) => error!(error = %e, "Photo capture failed"),
        }
        Vec::new()
    }

    /// Capture a still from the preview stream
    pub(crate) fn handle_take_snapshot(&mut self) -> Vec<Command> {
        if self.mode != DemoMode::TakeSnapshot || !self.active_view().is_mounted() {
            debug!("Snapshot ignored outside snapshot mode");
            return Vec::new();
        }
        let Some(frame) = &self.current_frame else {
            info!("No frame available to snapshot");
            return Vec::new();
        };
        if !self.command_state.try_begin(CommandKind::Snapshot) {
            warn!("Camera busy, snapshot command rejected");
            return Vec::new();
        }

        let options = SnapshotOptions {
            quality: self.config.snapshot_quality,
            skip_metadata: self.config.snapshot_skip_metadata,
        };
        info!(quality = options.quality, "Capturing snapshot");
        vec![Command::EncodeSnapshot {
            frame: FrameRef(frame.clone()),
            options,
        }]
    }

    pub(crate) fn handle_snapshot_saved(
        &mut self,
        result: Result<PathBuf, String>,
    ) -> Vec<Command> {
        self.command_state.finish();
        match result {
            Ok(path) => {
                if self.mode == DemoMode::TakeSnapshot {
                    info!(path = %path.display(), "Snapshot saved");
                    self.media.snapshot_path = Some(path);
                } else {
                    warn!(path = %path.display(), "Discarding snapshot saved after mode switch");
                }
            }
            Err(e) => error!(error = %e, "Snapshot failed"),
        }
        Vec::new()
    }

    /// Start or stop video recording depending on the current state
    pub(crate) fn handle_toggle_recording(&mut self) -> Vec<Command> {
        if self.mode != DemoMode::RecordVideo || !self.active_view().is_mounted() {
            debug!("Recording toggle ignored outside video mode");
            return Vec::new();
        }

        if self.recording.is_recording() {
            if !self.command_state.try_begin(CommandKind::StopRecording) {
                warn!("Camera busy, stop command rejected");
                return Vec::new();
            }
            info!("Stopping recording");
            return vec![Command::StopRecording];
        }

        if !self.command_state.try_begin(CommandKind::StartRecording) {
            warn!("Camera busy, record command rejected");
            return Vec::new();
        }
        let path = storage::video_output_path();
        info!(path = %path.display(), flash = %self.config.flash_mode, "Starting recording");
        vec![Command::StartRecording {
            path,
            flash: self.config.flash_mode,
        }]
    }

    pub(crate) fn handle_recording_started(&mut self, path: PathBuf) -> Vec<Command> {
        self.command_state.finish();
        if self.mode != DemoMode::RecordVideo {
            // Mode switched before the backend confirmed; release the device
            warn!("Recording started after mode switch, stopping immediately");
            return vec![Command::StopRecording];
        }
        self.recording = RecordingState::start(path);
        Vec::new()
    }

    /// Completion callback for the recording: stores the finished file's
    /// path exactly once. The error arm only reports; it does not change
    /// the mode or clear state.
    pub(crate) fn handle_recording_stopped(
        &mut self,
        result: Result<PathBuf, String>,
    ) -> Vec<Command> {
        // A mode-switch stop never claimed the guard; its completion must
        // not release a claim held by another in-flight command.
        if matches!(
            self.command_state,
            CommandState::Busy(CommandKind::StartRecording | CommandKind::StopRecording)
        ) {
            self.command_state.finish();
        }
        self.recording.stop();
        match result {
            Ok(path) => {
                if self.mode == DemoMode::RecordVideo {
                    info!(path = %path.display(), "Recording saved");
                    self.media.video_path = Some(path);
                } else {
                    warn!(path = %path.display(), "Discarding recording saved after mode switch");
                }
            }
            Err(e) => error!(error = %e, "Recording failed"),
        }
        Vec::new()
    }
}
