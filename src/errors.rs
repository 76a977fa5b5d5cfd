// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera demo application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Permission-related errors
    Permission(PermissionError),
    /// Camera device errors
    Device(DeviceError),
    /// Photo/snapshot capture errors
    Capture(CaptureError),
    /// Video recording errors
    Recording(RecordingError),
    /// Storage/filesystem errors
    Storage(String),
    /// Configuration errors
    Config(String),
}

/// Camera permission errors
#[derive(Debug, Clone)]
pub enum PermissionError {
    /// The user denied camera access
    Denied,
    /// The permission request itself failed
    RequestFailed(String),
}

/// Camera device errors
#[derive(Debug, Clone)]
pub enum DeviceError {
    /// No rear camera device found
    NoRearCamera,
    /// Device enumeration failed
    EnumerationFailed(String),
    /// Device initialization failed
    InitializationFailed(String),
    /// Device disconnected during operation
    Disconnected,
    /// Device is busy with another command
    Busy,
}

/// Photo and snapshot capture errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No frame available to capture
    NoFrameAvailable,
    /// Capture failed in the backend
    CaptureFailed(String),
    /// Image encoding failed
    EncodingFailed(String),
    /// Saving the file failed
    SaveFailed(String),
}

/// Video recording errors
#[derive(Debug, Clone)]
pub enum RecordingError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to stop or finalize recording
    StopFailed(String),
    /// Recording already in progress
    AlreadyRecording,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Device(e) => write!(f, "Device error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Denied => write!(f, "Camera access denied"),
            PermissionError::RequestFailed(msg) => write!(f, "Permission request failed: {}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoRearCamera => write!(f, "No rear camera device found"),
            DeviceError::EnumerationFailed(msg) => write!(f, "Enumeration failed: {}", msg),
            DeviceError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            DeviceError::Disconnected => write!(f, "Camera disconnected"),
            DeviceError::Busy => write!(f, "Camera is busy"),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CaptureError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            RecordingError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PermissionError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for RecordingError {}

// Conversions from sub-errors to AppError
impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::Device(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}
