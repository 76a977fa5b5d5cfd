// SPDX-License-Identifier: GPL-3.0-only

//! Simulated camera backend
//!
//! Produces synthetic test-pattern frames so the demo screen and the test
//! suite run without camera hardware. Photo capture returns a
//! full-resolution pattern frame; video recording writes a small manifest
//! file describing the simulated session.

use super::{
    BackendResult, CameraBackend, CameraDevice, CameraFrame, CameraPosition, FlashMode,
    FrameReceiver, PermissionStatus, PixelFormat,
};
use crate::constants::{FRAME_CHANNEL_CAPACITY, SIMULATED_FRAME_INTERVAL};
use crate::errors::{AppError, CaptureError, DeviceError, RecordingError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Preview resolution of the simulated sensor
const PREVIEW_WIDTH: u32 = 640;
const PREVIEW_HEIGHT: u32 = 480;

/// Full-resolution photo capture size
const PHOTO_WIDTH: u32 = 1280;
const PHOTO_HEIGHT: u32 = 960;

struct ActiveRecording {
    output_path: PathBuf,
    started_at: Instant,
    flash: FlashMode,
}

/// Camera backend producing synthetic frames
pub struct SimulatedBackend {
    permission: PermissionStatus,
    devices: Vec<CameraDevice>,
    current_device: Option<CameraDevice>,
    frame_receiver: Option<FrameReceiver>,
    stop_flag: Option<Arc<AtomicBool>>,
    recording: Option<ActiveRecording>,
    /// When set, capture and recording commands fail (for exercising the
    /// error paths)
    fail_captures: bool,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self {
            permission: PermissionStatus::Authorized,
            devices: vec![
                CameraDevice {
                    name: "Simulated Rear Camera".to_string(),
                    path: "sim:0".to_string(),
                    position: CameraPosition::Back,
                },
                CameraDevice {
                    name: "Simulated Front Camera".to_string(),
                    path: "sim:1".to_string(),
                    position: CameraPosition::Front,
                },
            ],
            current_device: None,
            frame_receiver: None,
            stop_flag: None,
            recording: None,
            fail_captures: false,
        }
    }

    /// Simulate a user denying the permission prompt
    pub fn deny_permission(mut self) -> Self {
        self.permission = PermissionStatus::Denied;
        self
    }

    /// Simulate a system with no camera devices at all
    pub fn without_devices(mut self) -> Self {
        self.devices.clear();
        self
    }

    /// Simulate hardware failures for capture and recording commands
    pub fn failing_captures(mut self) -> Self {
        self.fail_captures = true;
        self
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SimulatedBackend {
    fn request_permission(&mut self) -> PermissionStatus {
        debug!(status = ?self.permission, "Simulated permission request");
        self.permission
    }

    fn enumerate_devices(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn initialize(&mut self, device: &CameraDevice) -> BackendResult<()> {
        if self.permission != PermissionStatus::Authorized {
            return Err(crate::errors::PermissionError::Denied.into());
        }
        if !self.devices.contains(device) {
            return Err(DeviceError::InitializationFailed(format!(
                "unknown device: {}",
                device.path
            ))
            .into());
        }
        if self.stop_flag.is_some() {
            self.shutdown()?;
        }

        let (sender, receiver) = futures::channel::mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let producer_stop = Arc::clone(&stop_flag);

        std::thread::Builder::new()
            .name("sim-frame-producer".to_string())
            .spawn(move || frame_producer(sender, producer_stop))
            .map_err(|e| DeviceError::InitializationFailed(e.to_string()))?;

        self.current_device = Some(device.clone());
        self.frame_receiver = Some(receiver);
        self.stop_flag = Some(stop_flag);

        info!(device = %device.name, "Simulated backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        if self.recording.is_some() {
            // Finalize rather than lose the file
            let _ = self.stop_recording();
        }
        if let Some(flag) = self.stop_flag.take() {
            flag.store(true, Ordering::Relaxed);
        }
        self.frame_receiver = None;
        self.current_device = None;
        debug!("Simulated backend shut down");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.stop_flag.is_some()
    }

    fn capture_photo(&mut self, flash: FlashMode) -> BackendResult<CameraFrame> {
        if !self.is_initialized() {
            return Err(CaptureError::CaptureFailed("backend not initialized".into()).into());
        }
        if self.fail_captures {
            return Err(CaptureError::CaptureFailed("simulated hardware fault".into()).into());
        }
        debug!(%flash, "Simulated photo capture");
        Ok(test_pattern_frame(PHOTO_WIDTH, PHOTO_HEIGHT, 0))
    }

    fn start_recording(&mut self, output_path: PathBuf, flash: FlashMode) -> BackendResult<()> {
        if !self.is_initialized() {
            return Err(RecordingError::StartFailed("backend not initialized".into()).into());
        }
        if self.recording.is_some() {
            return Err(RecordingError::AlreadyRecording.into());
        }
        if self.fail_captures {
            return Err(RecordingError::StartFailed("simulated hardware fault".into()).into());
        }
        info!(path = %output_path.display(), %flash, "Simulated recording started");
        self.recording = Some(ActiveRecording {
            output_path,
            started_at: Instant::now(),
            flash,
        });
        Ok(())
    }

    fn stop_recording(&mut self) -> BackendResult<PathBuf> {
        let Some(recording) = self.recording.take() else {
            return Err(RecordingError::StopFailed("no recording in progress".into()).into());
        };

        let elapsed = recording.started_at.elapsed();
        let frame_count = (elapsed.as_millis() / SIMULATED_FRAME_INTERVAL.as_millis()).max(1);

        if let Some(parent) = recording.output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::from(RecordingError::StopFailed(e.to_string())))?;
        }
        let mut file = std::fs::File::create(&recording.output_path)
            .map_err(|e| AppError::from(RecordingError::StopFailed(e.to_string())))?;
        writeln!(
            file,
            "SIMCAM recording\nduration_ms={}\nframes={}\nflash={}",
            elapsed.as_millis(),
            frame_count,
            recording.flash
        )
        .map_err(|e| AppError::from(RecordingError::StopFailed(e.to_string())))?;

        info!(
            path = %recording.output_path.display(),
            duration_ms = elapsed.as_millis(),
            "Simulated recording finalized"
        );
        Ok(recording.output_path)
    }

    fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn take_frame_receiver(&mut self) -> Option<FrameReceiver> {
        self.frame_receiver.take()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.current_device.as_ref()
    }
}

/// Preview frame producer loop.
///
/// Runs on its own thread at ~30 fps until the stop flag is set or the
/// receiver is dropped. Frames are dropped when the channel is full; the
/// consumer always wants the latest frame.
fn frame_producer(
    mut sender: futures::channel::mpsc::Sender<Arc<CameraFrame>>,
    stop_flag: Arc<AtomicBool>,
) {
    let mut tick: u32 = 0;
    loop {
        if stop_flag.load(Ordering::Relaxed) {
            debug!("Frame producer stopping");
            return;
        }

        let frame = Arc::new(test_pattern_frame(PREVIEW_WIDTH, PREVIEW_HEIGHT, tick));
        match sender.try_send(frame) {
            Ok(()) => {}
            Err(e) if e.is_full() => {
                // Consumer is behind; skip this frame
            }
            Err(_) => {
                warn!("Frame channel closed, stopping producer");
                return;
            }
        }

        tick = tick.wrapping_add(1);
        std::thread::sleep(SIMULATED_FRAME_INTERVAL);
    }
}

/// Generate a moving RGBA gradient test pattern
fn test_pattern_frame(width: u32, height: u32, tick: u32) -> CameraFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    let phase = (tick % 256) as u32;
    for y in 0..height {
        for x in 0..width {
            let r = (((x * 255) / width + phase) % 256) as u8;
            let g = ((y * 255) / height) as u8;
            let b = ((255 - (x * 255) / width) % 256) as u8;
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    CameraFrame::from_packed(width, height, PixelFormat::RGBA, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_includes_rear_device() {
        let backend = SimulatedBackend::new();
        let devices = backend.enumerate_devices();
        assert!(
            devices
                .iter()
                .any(|d| d.position == CameraPosition::Back)
        );
    }

    #[test]
    fn stop_without_start_is_an_error() {
        let mut backend = SimulatedBackend::new();
        assert!(backend.stop_recording().is_err());
    }

    #[test]
    fn recording_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.rec");

        let mut backend = SimulatedBackend::new();
        let device = backend.enumerate_devices()[0].clone();
        backend.initialize(&device).unwrap();

        backend
            .start_recording(path.clone(), FlashMode::Off)
            .unwrap();
        assert!(backend.is_recording());

        let saved = backend.stop_recording().unwrap();
        assert_eq!(saved, path);
        assert!(!backend.is_recording());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("SIMCAM recording"));
    }

    #[test]
    fn double_start_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = SimulatedBackend::new();
        let device = backend.enumerate_devices()[0].clone();
        backend.initialize(&device).unwrap();

        backend
            .start_recording(dir.path().join("a.rec"), FlashMode::Off)
            .unwrap();
        assert!(
            backend
                .start_recording(dir.path().join("b.rec"), FlashMode::Off)
                .is_err()
        );
    }

    #[test]
    fn initialize_fails_when_denied() {
        let mut backend = SimulatedBackend::new().deny_permission();
        assert_eq!(backend.request_permission(), PermissionStatus::Denied);
        let device = CameraDevice {
            name: "Simulated Rear Camera".to_string(),
            path: "sim:0".to_string(),
            position: CameraPosition::Back,
        };
        assert!(backend.initialize(&device).is_err());
    }

    #[test]
    fn failing_backend_reports_capture_error() {
        let mut backend = SimulatedBackend::new().failing_captures();
        let device = backend.enumerate_devices()[0].clone();
        backend.initialize(&device).unwrap();
        assert!(backend.capture_photo(FlashMode::Auto).is_err());
    }
}
