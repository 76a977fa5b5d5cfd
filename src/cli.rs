// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking a one-shot photo without the interactive screen

use camera_demo::backends::types::{CameraPosition, PermissionStatus};
use camera_demo::backends;
use camera_demo::storage;
use std::path::PathBuf;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let mut backend = backends::get_backend();

    if backend.request_permission() == PermissionStatus::Denied {
        return Err("Camera permission denied".into());
    }

    let devices = backend.enumerate_devices();
    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {} ({})", index, device.name, device.position);
        println!("      Path: {}", device.path);
    }

    Ok(())
}

/// Take a photo using the specified camera
pub fn take_photo(
    camera_index: usize,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut backend = backends::get_backend();

    if backend.request_permission() == PermissionStatus::Denied {
        return Err("Camera permission denied".into());
    }

    let devices = backend.enumerate_devices();
    if devices.is_empty() {
        return Err("No cameras found".into());
    }
    if camera_index >= devices.len() {
        return Err(format!(
            "Camera index {} out of range (0-{})",
            camera_index,
            devices.len() - 1
        )
        .into());
    }

    let device = &devices[camera_index];
    if device.position != CameraPosition::Back {
        println!("Note: camera {} is not rear-facing", camera_index);
    }
    println!("Using camera: {}", device.name);

    backend.initialize(device)?;

    println!("Capturing...");
    let frame = backend.capture_photo(Default::default())?;

    let path = output.unwrap_or_else(storage::photo_output_path);
    storage::save_photo(&frame, &path)?;
    println!("Saved: {}", path.display());

    backend.shutdown()?;
    Ok(())
}
