// SPDX-License-Identifier: MPL-2.0
// Camera backend with trait-based abstraction

//! Camera backend abstraction
//!
//! The application never talks to camera hardware directly. Everything goes
//! through the [`CameraBackend`] trait: permission requests, device
//! enumeration, preview frames, photo capture, and video recording. The
//! crate ships a [`simulated::SimulatedBackend`] so the demo and the test
//! suite run without any camera attached.

pub mod simulated;
pub mod types;

pub use types::*;

use crate::errors::AppError;
use std::path::PathBuf;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, AppError>;

/// Complete camera backend trait
///
/// A backend provides:
/// - Permission handling and device enumeration
/// - Lifecycle management (initialize, shutdown)
/// - Capture operations (photo, video recording)
/// - Preview frame streaming
pub trait CameraBackend: Send {
    // ===== Permission & Enumeration =====

    /// Request camera access from the host platform.
    ///
    /// Called once on startup. The returned status is final for the session;
    /// the application never re-requests.
    fn request_permission(&mut self) -> PermissionStatus;

    /// Enumerate available camera devices on this backend
    fn enumerate_devices(&self) -> Vec<CameraDevice>;

    // ===== Lifecycle =====

    /// Initialize the backend with a specific camera device.
    ///
    /// Starts the preview frame producer. Must be called before any capture
    /// operation or frame receiver access.
    fn initialize(&mut self, device: &CameraDevice) -> BackendResult<()>;

    /// Shutdown the backend and release the device.
    ///
    /// Stops any active recording and the preview producer. After shutdown,
    /// the backend must be reinitialized before use.
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Check if the backend is currently initialized
    fn is_initialized(&self) -> bool;

    // ===== Capture: Photo =====

    /// Capture a single full-resolution frame.
    ///
    /// Independent of the preview stream; the preview is not interrupted.
    fn capture_photo(&mut self, flash: FlashMode) -> BackendResult<CameraFrame>;

    // ===== Capture: Video =====

    /// Start recording to a file. Only one recording can be active at a time.
    fn start_recording(&mut self, output_path: PathBuf, flash: FlashMode) -> BackendResult<()>;

    /// Stop recording and finalize the file, returning its path.
    fn stop_recording(&mut self) -> BackendResult<PathBuf>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    // ===== Preview =====

    /// Take the receiver for preview frames.
    ///
    /// Frames flow continuously while the backend is initialized. Returns
    /// `None` if not initialized or if the receiver was already taken.
    fn take_frame_receiver(&mut self) -> Option<FrameReceiver>;

    // ===== Metadata =====

    /// Check if this backend is usable on the current system
    fn is_available(&self) -> bool;

    /// Get the currently active camera device (if initialized)
    fn current_device(&self) -> Option<&CameraDevice>;
}

/// Get the default backend instance
pub fn get_backend() -> Box<dyn CameraBackend> {
    Box::new(simulated::SimulatedBackend::new())
}
