// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured media
//!
//! Paths follow the XDG media directories: photos and snapshots under
//! `~/Pictures/camera-demo`, recordings under `~/Videos/camera-demo`,
//! with a timestamped filename per capture.

use crate::backends::types::{CameraFrame, PixelFormat, SnapshotOptions};
use crate::constants::{APP_NAME, PHOTO_QUALITY};
use crate::errors::CaptureError;
use image::codecs::jpeg::JpegEncoder;
use std::path::PathBuf;
use tracing::debug;

/// Directory for photos and snapshots
pub fn picture_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory for video recordings
pub fn video_directory() -> PathBuf {
    dirs::video_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S%.3f").to_string()
}

/// Output path for a new photo
pub fn photo_output_path() -> PathBuf {
    picture_directory().join(format!("IMG_{}.jpg", timestamp()))
}

/// Output path for a new snapshot
pub fn snapshot_output_path() -> PathBuf {
    picture_directory().join(format!("SNAP_{}.jpg", timestamp()))
}

/// Output path for a new recording
pub fn video_output_path() -> PathBuf {
    video_directory().join(format!("VID_{}.rec", timestamp()))
}

/// Encode a frame as JPEG and write it to `path`.
///
/// Used by both photo capture (full-resolution frame from the backend) and
/// snapshot capture (preview frame, caller-chosen quality).
pub fn save_frame_jpeg(
    frame: &CameraFrame,
    path: &PathBuf,
    quality: u8,
    skip_metadata: bool,
) -> Result<(), CaptureError> {
    let rgb = frame_to_rgb(frame)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.min(100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

    if !skip_metadata {
        // Capture time travels in the filename; mtime is the only other
        // metadata the demo records
        debug!(path = %path.display(), "Capture metadata retained");
    }

    debug!(path = %path.display(), quality, "Frame saved");
    Ok(())
}

/// Convert a camera frame to a tightly packed RGB image
fn frame_to_rgb(frame: &CameraFrame) -> Result<image::RgbImage, CaptureError> {
    let width = frame.width;
    let height = frame.height;
    if width == 0 || height == 0 {
        return Err(CaptureError::EncodingFailed("empty frame".into()));
    }

    let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = frame.sample_rgb(x, y);
            rgb_data.push(r);
            rgb_data.push(g);
            rgb_data.push(b);
        }
    }

    image::RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| CaptureError::EncodingFailed("frame dimensions mismatch".into()))
}

/// Convenience wrapper: photo captures always use the fixed photo quality
pub fn save_photo(frame: &CameraFrame, path: &PathBuf) -> Result<(), CaptureError> {
    save_frame_jpeg(frame, path, PHOTO_QUALITY, true)
}

/// Convenience wrapper applying snapshot options
pub fn save_snapshot(
    frame: &CameraFrame,
    path: &PathBuf,
    options: &SnapshotOptions,
) -> Result<(), CaptureError> {
    save_frame_jpeg(frame, path, options.quality, options.skip_metadata)
}
