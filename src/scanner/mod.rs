// SPDX-License-Identifier: MPL-2.0

//! Barcode detection abstraction
//!
//! The application treats barcode decoding as an opaque collaborator behind
//! the [`BarcodeDetector`] trait. The production implementation is
//! [`qr::QrDetector`], backed by the rqrr crate.

pub mod qr;

pub use qr::QrDetector;

use crate::backends::types::CameraFrame;

/// Barcode symbologies the scanner can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    /// QR codes (the only symbology the demo scans for)
    Qr,
}

/// A single decoded barcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    /// Human-readable decoded content
    pub display_value: String,
}

/// Barcode detection over camera frames.
///
/// Implementations must be cheap to call repeatedly and must never panic on
/// malformed frame data; undecodable frames yield an empty result.
pub trait BarcodeDetector: Send + Sync {
    /// Detect barcodes of the requested formats in a frame.
    ///
    /// Returns decoded barcodes in detection order. An empty result means no
    /// code of the requested formats was found.
    fn detect(&self, frame: &CameraFrame, formats: &[BarcodeFormat]) -> Vec<Barcode>;
}
