// SPDX-License-Identifier: MPL-2.0
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result of a camera permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user granted camera access
    Authorized,
    /// The user denied camera access
    Denied,
}

/// Physical placement of a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraPosition {
    /// Rear-facing camera
    Back,
    /// Front-facing camera
    Front,
    /// External camera (USB webcam, capture card)
    External,
}

impl std::fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraPosition::Back => write!(f, "back"),
            CameraPosition::Front => write!(f, "front"),
            CameraPosition::External => write!(f, "external"),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Backend-specific device path or node identifier
    pub path: String,
    pub position: CameraPosition,
}

/// Device resolution state for the rear camera.
///
/// An explicit tri-state instead of sentinel values: `Pending` while
/// enumeration has not completed, `Found` once a rear device is selected,
/// `Absent` when enumeration finished (or timed out) without one.
/// `Absent` is a valid terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceResolution {
    /// Enumeration has not completed yet
    #[default]
    Pending,
    /// A rear camera device was found
    Found(CameraDevice),
    /// No rear camera device exists
    Absent,
}

impl DeviceResolution {
    /// Get the resolved device, if any
    pub fn device(&self) -> Option<&CameraDevice> {
        match self {
            DeviceResolution::Found(device) => Some(device),
            _ => None,
        }
    }

    /// Check if resolution is still pending
    pub fn is_pending(&self) -> bool {
        matches!(self, DeviceResolution::Pending)
    }
}

/// Flash setting for capture commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlashMode {
    On,
    #[default]
    Off,
    Auto,
}

impl std::fmt::Display for FlashMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlashMode::On => write!(f, "on"),
            FlashMode::Off => write!(f, "off"),
            FlashMode::Auto => write!(f, "auto"),
        }
    }
}

/// Options for snapshot capture (a still grabbed from the preview stream)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// JPEG quality, 0-100
    pub quality: u8,
    /// Skip writing capture metadata (timestamp comment) into the file
    pub skip_metadata: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            quality: crate::constants::DEFAULT_SNAPSHOT_QUALITY,
            skip_metadata: true,
        }
    }
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single frame delivered by a camera backend
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, including any padding
    pub stride: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame from tightly packed pixel data (stride = width * bpp)
    pub fn from_packed(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
            data: Arc::from(data),
            captured_at: Instant::now(),
        }
    }

    /// Raw pixel data
    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }

    /// Sample a pixel as RGB, clamping coordinates to the frame bounds
    pub fn sample_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let data = self.data_slice();

        match self.format {
            PixelFormat::RGBA => {
                let idx = (y * self.stride + x * 4) as usize;
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::RGB24 => {
                let idx = (y * self.stride + x * 3) as usize;
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::Gray8 => {
                let idx = (y * self.stride + x) as usize;
                if idx < data.len() {
                    let v = data[idx];
                    (v, v, v)
                } else {
                    (0, 0, 0)
                }
            }
        }
    }
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CameraFrame {{ {}x{} {:?}, {} bytes }}",
            self.width,
            self.height,
            self.format,
            self.data.len()
        )
    }
}

/// Receiver for preview frames from a camera backend
pub type FrameReceiver = futures::channel::mpsc::Receiver<Arc<CameraFrame>>;

/// Sender side of the preview frame channel
pub type FrameSender = futures::channel::mpsc::Sender<Arc<CameraFrame>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rgb_respects_stride() {
        // 2x2 RGBA frame with 2 bytes of padding per row
        let data: Vec<u8> = vec![
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, // padding
            0, 0, 255, 255, // blue
            255, 255, 255, 255, // white
            0, 0, // padding
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            stride: 10,
            format: PixelFormat::RGBA,
            data: Arc::from(data),
            captured_at: Instant::now(),
        };

        assert_eq!(frame.sample_rgb(0, 0), (255, 0, 0));
        assert_eq!(frame.sample_rgb(1, 0), (0, 255, 0));
        assert_eq!(frame.sample_rgb(0, 1), (0, 0, 255));
        assert_eq!(frame.sample_rgb(1, 1), (255, 255, 255));
    }

    #[test]
    fn sample_rgb_clamps_out_of_bounds() {
        let frame = CameraFrame::from_packed(1, 1, PixelFormat::Gray8, vec![42]);
        assert_eq!(frame.sample_rgb(10, 10), (42, 42, 42));
    }

    #[test]
    fn device_resolution_states() {
        let pending = DeviceResolution::Pending;
        assert!(pending.is_pending());
        assert!(pending.device().is_none());

        let found = DeviceResolution::Found(CameraDevice {
            name: "rear".into(),
            path: "/dev/video0".into(),
            position: CameraPosition::Back,
        });
        assert!(!found.is_pending());
        assert_eq!(found.device().unwrap().position, CameraPosition::Back);

        assert!(DeviceResolution::Absent.device().is_none());
    }
}
