// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection
//!
//! Converts camera frames to grayscale and decodes QR codes with rqrr.
//! Frames larger than the processing ceiling are downscaled first; QR codes
//! are typically large enough in frame to survive the downscale.

use super::{Barcode, BarcodeDetector, BarcodeFormat};
use crate::backends::types::{CameraFrame, PixelFormat};
use image::GrayImage;
use tracing::{debug, trace};

/// rqrr-backed QR detector
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            // 640px is enough for detection and keeps per-frame cost low
            max_dimension: 640,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl BarcodeDetector for QrDetector {
    fn detect(&self, frame: &CameraFrame, formats: &[BarcodeFormat]) -> Vec<Barcode> {
        if !formats.contains(&BarcodeFormat::Qr) {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let gray = frame_to_gray(frame, self.max_dimension);
        let conversion_time = start.elapsed();

        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();

        let mut barcodes = Vec::with_capacity(grids.len());
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    debug!(content = %content, "Decoded QR code");
                    barcodes.push(Barcode {
                        display_value: content,
                    });
                }
                Err(e) => {
                    // Partial or damaged code in frame; skip it
                    debug!(error = %e, "Failed to decode QR grid");
                }
            }
        }

        trace!(
            count = barcodes.len(),
            conversion_ms = conversion_time.as_millis(),
            total_ms = start.elapsed().as_millis(),
            "QR detection pass complete"
        );
        barcodes
    }
}

/// Convert a camera frame to a grayscale image, dropping stride padding and
/// downscaling (nearest neighbor) when either dimension exceeds `max_dim`.
fn frame_to_gray(frame: &CameraFrame, max_dim: u32) -> GrayImage {
    let (out_width, out_height) = if frame.width > max_dim || frame.height > max_dim {
        let scale = (frame.width as f32 / max_dim as f32).max(frame.height as f32 / max_dim as f32);
        (
            ((frame.width as f32 / scale) as u32).max(1),
            ((frame.height as f32 / scale) as u32).max(1),
        )
    } else {
        (frame.width, frame.height)
    };

    let data = frame.data_slice();
    let stride = frame.stride as usize;
    let mut out = Vec::with_capacity((out_width * out_height) as usize);

    for oy in 0..out_height {
        let sy = (oy as u64 * frame.height as u64 / out_height as u64) as usize;
        for ox in 0..out_width {
            let sx = (ox as u64 * frame.width as u64 / out_width as u64) as usize;
            let luma = match frame.format {
                PixelFormat::RGBA => {
                    let idx = sy * stride + sx * 4;
                    if idx + 2 < data.len() {
                        luma_601(data[idx], data[idx + 1], data[idx + 2])
                    } else {
                        0
                    }
                }
                PixelFormat::RGB24 => {
                    let idx = sy * stride + sx * 3;
                    if idx + 2 < data.len() {
                        luma_601(data[idx], data[idx + 1], data[idx + 2])
                    } else {
                        0
                    }
                }
                PixelFormat::Gray8 => {
                    let idx = sy * stride + sx;
                    data.get(idx).copied().unwrap_or(0)
                }
            };
            out.push(luma);
        }
    }

    // Dimensions and buffer length match by construction
    GrayImage::from_raw(out_width, out_height, out)
        .unwrap_or_else(|| GrayImage::new(out_width.max(1), out_height.max(1)))
}

/// BT.601 luma from RGB
fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).clamp(0.0, 255.0) as u8
}
