// SPDX-License-Identifier: MPL-2.0

//! Camera Demo - a guided tour of camera capture modes
//!
//! This library implements a small camera demonstration: a permission gate,
//! rear-camera resolution, a mode picker, and four capture modes (photo,
//! video recording, preview snapshot, and QR code scanning).
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application state machine (model, messages, commands)
//! - [`backends`]: Camera backend abstraction and the simulated backend
//! - [`scanner`]: Barcode detection over camera frames
//! - [`config`]: User configuration handling
//! - [`storage`]: Captured media storage
//! - [`terminal`]: Interactive terminal frontend
//!
//! The state machine is pure: [`app::AppModel::update`] consumes a
//! [`app::Message`] and returns the [`app::Command`] effects to run. The
//! terminal frontend executes those effects against a
//! [`backends::CameraBackend`] and feeds the results back as messages.

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod scanner;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::frame_processor::FrameProcessor;
pub use app::{AppModel, Command, DemoMode, Message};
pub use backends::types::DeviceResolution;
pub use config::Config;
