// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor for code-scanner mode
//!
//! Receives preview frames, runs barcode detection at a capped rate, and
//! publishes the latest decoded text through a watch cell. The watch cell
//! is the only state crossing from the frame context back to the
//! interactive context: a single writer here, readers that only borrow the
//! current value at draw time. No message traffic, no full redraw per
//! frame.
//!
//! Detection is CPU-bound and runs under `spawn_blocking`; a panicking
//! detector loses that frame's result and nothing else.

use crate::backends::types::{CameraFrame, FrameReceiver};
use crate::constants::SCANNER_FRAME_INTERVAL;
use crate::scanner::{Barcode, BarcodeDetector, BarcodeFormat};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Rate-capped barcode detection over the preview stream
pub struct FrameProcessor {
    detector: Arc<dyn BarcodeDetector>,
    /// Minimum time between detection passes (the fps ceiling)
    min_interval: Duration,
    last_pass: Option<Instant>,
    tx: watch::Sender<String>,
}

impl FrameProcessor {
    /// Create a processor with the default ~5 fps ceiling
    pub fn new(detector: Arc<dyn BarcodeDetector>) -> Self {
        Self::with_interval(detector, SCANNER_FRAME_INTERVAL)
    }

    /// Create a processor with a custom pass interval
    pub fn with_interval(detector: Arc<dyn BarcodeDetector>, min_interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self {
            detector,
            min_interval,
            last_pass: None,
            tx,
        }
    }

    /// Subscribe to the decoded text cell
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// The most recently published text
    pub fn latest(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Drive the processor over a frame stream until it closes.
    ///
    /// This is the scanner-mode task: it lives exactly as long as the
    /// scanner view is mounted.
    pub async fn run(mut self, mut frames: FrameReceiver) {
        while let Some(frame) = frames.next().await {
            self.pass_async(frame).await;
        }
        debug!("Frame processor detached");
    }

    /// Process one frame, off the interactive context
    pub async fn pass_async(&mut self, frame: Arc<CameraFrame>) {
        if !self.begin_pass() {
            return;
        }
        let detector = Arc::clone(&self.detector);
        let barcodes = tokio::task::spawn_blocking(move || {
            detector.detect(&frame, &[BarcodeFormat::Qr])
        })
        .await
        .unwrap_or_else(|e| {
            // Swallow per-frame failures; the previous text stays displayed
            warn!(error = %e, "Barcode detection task panicked");
            Vec::new()
        });
        self.publish(barcodes);
    }

    /// Process one frame synchronously (tests and offline use)
    pub fn process_frame(&mut self, frame: &CameraFrame) {
        if !self.begin_pass() {
            return;
        }
        let barcodes = self.detector.detect(frame, &[BarcodeFormat::Qr]);
        self.publish(barcodes);
    }

    /// Apply the rate cap. A frame inside the minimum interval is skipped;
    /// the cap is a ceiling, not a schedule.
    fn begin_pass(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_pass
            && now.duration_since(last) < self.min_interval
        {
            trace!("Frame skipped by rate cap");
            return false;
        }
        self.last_pass = Some(now);
        true
    }

    /// Publish the concatenation of all decoded values.
    ///
    /// Multiple codes in one frame join with no separator. A frame with no
    /// decodable code publishes nothing, leaving the previous text in place.
    fn publish(&self, barcodes: Vec<Barcode>) {
        if barcodes.is_empty() {
            return;
        }
        let text: String = barcodes
            .into_iter()
            .map(|b| b.display_value)
            .collect();
        debug!(text = %text, "Publishing decoded barcode text");
        self.tx.send_replace(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::types::PixelFormat;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Detector returning a scripted sequence of results
    struct ScriptedDetector {
        script: Mutex<VecDeque<Vec<Barcode>>>,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Vec<&str>>) -> Self {
            Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|values| {
                            values
                                .into_iter()
                                .map(|v| Barcode {
                                    display_value: v.to_string(),
                                })
                                .collect()
                        })
                        .collect(),
                ),
            }
        }
    }

    impl BarcodeDetector for ScriptedDetector {
        fn detect(&self, _frame: &CameraFrame, _formats: &[BarcodeFormat]) -> Vec<Barcode> {
            self.script.lock().unwrap().pop_front().unwrap_or_default()
        }
    }

    struct PanickyDetector;

    impl BarcodeDetector for PanickyDetector {
        fn detect(&self, _frame: &CameraFrame, _formats: &[BarcodeFormat]) -> Vec<Barcode> {
            panic!("detector exploded");
        }
    }

    fn test_frame() -> Arc<CameraFrame> {
        Arc::new(CameraFrame::from_packed(
            8,
            8,
            PixelFormat::Gray8,
            vec![0u8; 64],
        ))
    }

    #[test]
    fn publishes_concatenated_values_in_order() {
        let detector = Arc::new(ScriptedDetector::new(vec![vec!["A"], vec!["B", "C"]]));
        let mut processor = FrameProcessor::with_interval(detector, Duration::ZERO);
        let rx = processor.subscribe();

        processor.process_frame(&test_frame());
        assert_eq!(*rx.borrow(), "A");

        processor.process_frame(&test_frame());
        assert_eq!(*rx.borrow(), "BC");
    }

    #[test]
    fn empty_detection_keeps_previous_text() {
        let detector = Arc::new(ScriptedDetector::new(vec![vec!["A"], vec![]]));
        let mut processor = FrameProcessor::with_interval(detector, Duration::ZERO);
        let rx = processor.subscribe();

        processor.process_frame(&test_frame());
        processor.process_frame(&test_frame());
        assert_eq!(*rx.borrow(), "A");
    }

    #[test]
    fn rate_cap_skips_frames_inside_interval() {
        let detector = Arc::new(ScriptedDetector::new(vec![vec!["A"], vec!["B"]]));
        let mut processor =
            FrameProcessor::with_interval(detector, Duration::from_secs(3600));
        let rx = processor.subscribe();

        processor.process_frame(&test_frame());
        // Well inside the interval: skipped, "B" never consumed
        processor.process_frame(&test_frame());
        assert_eq!(*rx.borrow(), "A");
    }

    #[test]
    fn subscriber_sees_only_latest_value() {
        let detector = Arc::new(ScriptedDetector::new(vec![vec!["A"], vec!["B"]]));
        let mut processor = FrameProcessor::with_interval(detector, Duration::ZERO);
        let rx = processor.subscribe();

        processor.process_frame(&test_frame());
        processor.process_frame(&test_frame());
        // A reader inspecting now sees "B"; "A" is gone
        assert_eq!(*rx.borrow(), "B");
        assert_eq!(processor.latest(), "B");
    }

    #[tokio::test]
    async fn panicking_detector_is_swallowed() {
        let mut processor =
            FrameProcessor::with_interval(Arc::new(PanickyDetector), Duration::ZERO);
        let rx = processor.subscribe();

        processor.pass_async(test_frame()).await;
        assert_eq!(*rx.borrow(), "");
    }

    #[tokio::test]
    async fn run_consumes_stream_until_closed() {
        let detector = Arc::new(ScriptedDetector::new(vec![vec!["X"]]));
        let processor = FrameProcessor::with_interval(detector, Duration::ZERO);
        let rx = processor.subscribe();

        let (mut tx, frames) = futures::channel::mpsc::channel(4);
        let task = tokio::spawn(processor.run(frames));

        tx.try_send(test_frame()).unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(*rx.borrow(), "X");
    }
}
