// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application name used for media directories
pub const APP_NAME: &str = "camera-demo";

/// Ceiling on barcode detection passes, in frames per second.
///
/// This is a cap, not a guarantee: frames arriving faster than this are
/// skipped, frames arriving slower are all processed.
pub const SCANNER_MAX_FPS: u32 = 5;

/// Minimum interval between two barcode detection passes
pub const SCANNER_FRAME_INTERVAL: Duration = Duration::from_millis(1000 / SCANNER_MAX_FPS as u64);

/// Default JPEG quality for snapshots (0-100)
pub const DEFAULT_SNAPSHOT_QUALITY: u8 = 85;

/// JPEG quality for full photo captures (0-100)
pub const PHOTO_QUALITY: u8 = 95;

/// How long the device resolver waits for enumeration before reporting
/// that no camera is available
pub const DEVICE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded capacity for the preview frame channel.
///
/// Small on purpose: the consumer always wants the latest frame, so older
/// frames are dropped rather than queued.
pub const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Target interval between simulated preview frames (~30 fps)
pub const SIMULATED_FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_interval_matches_fps_cap() {
        assert_eq!(SCANNER_FRAME_INTERVAL, Duration::from_millis(200));
    }

    #[test]
    fn snapshot_quality_in_range() {
        assert!(DEFAULT_SNAPSHOT_QUALITY <= 100);
        assert!(PHOTO_QUALITY <= 100);
    }
}
