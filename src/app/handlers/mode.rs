// SPDX-License-Identifier: GPL-3.0-only

//! Mode picker and mode selection handlers

use crate::app::state::{AppModel, Command, DemoMode};
use tracing::{debug, info};

impl AppModel {
    pub(crate) fn handle_toggle_picker(&mut self) -> Vec<Command> {
        self.picker_open = !self.picker_open;
        if self.picker_open {
            self.picker_index = DemoMode::ALL
                .iter()
                .position(|m| *m == self.mode)
                .unwrap_or(0);
        }
        Vec::new()
    }

    pub(crate) fn handle_close_picker(&mut self) -> Vec<Command> {
        self.picker_open = false;
        Vec::new()
    }

    pub(crate) fn handle_picker_highlight(&mut self, index: usize) -> Vec<Command> {
        if index < DemoMode::ALL.len() {
            self.picker_index = index;
        }
        Vec::new()
    }

    /// The single mode mutation entrypoint.
    ///
    /// Clears all captured media paths, sets the mode, and closes the
    /// picker. Transient per-mode state never survives a switch: an active
    /// recording is stopped, and the frame processor is attached or
    /// detached to keep exactly one preview configuration on the device.
    pub(crate) fn handle_select_mode(&mut self, new_mode: DemoMode) -> Vec<Command> {
        let previous = self.mode;
        self.picker_open = false;

        if new_mode == previous {
            debug!(mode = %new_mode, "Mode unchanged");
            return Vec::new();
        }

        info!(from = %previous, to = %new_mode, "Switching mode");

        self.media.clear();
        self.mode = new_mode;

        let mut commands = Vec::new();

        if self.recording.is_recording() {
            // The device cannot stay bound to the recording configuration
            // once the mode changes; the late stop result is discarded by
            // handle_recording_stopped because the mode moved on.
            self.recording.stop();
            commands.push(Command::StopRecording);
        }

        if previous == DemoMode::CodeScanner {
            commands.push(Command::StopScanner);
        }
        if new_mode == DemoMode::CodeScanner && self.active_view().is_mounted() {
            commands.push(Command::StartScanner);
        }

        commands
    }
}
