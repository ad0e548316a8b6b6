// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for scanning without the GUI
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Decoding codes from an image file
//! - Scanning from a camera until a code is read

use futures::StreamExt;
use futures::channel::mpsc;
use scanner::app::frame_processor::tasks::QrDetector;
use scanner::app::frame_processor::{FrameRegion, ScanResult};
use scanner::app::scanner::{ScannerOptions, ScannerScreen};
use scanner::backends::camera::{CameraBackend, get_backend};
use scanner::backends::haptics;
use scanner::config::Config;
use scanner::constants::{app_info, pipeline};
use scanner::errors::{AppError, AppResult, CameraError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// List all available cameras
pub fn list_cameras() -> AppResult<()> {
    let cameras = get_backend().enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Source: {}", camera.source_description());
    }

    Ok(())
}

/// Decode every code in an image file
pub fn decode_image(path: &Path, json: bool) -> AppResult<()> {
    let image = image::open(path)?.to_rgba8();
    let results = QrDetector::new().detect_rgba(&image, FrameRegion::FULL);

    print_results(&results, json)?;

    if results.is_empty() {
        return Err(AppError::Decode(format!(
            "No code found in {}",
            path.display()
        )));
    }
    Ok(())
}

/// Scan from a camera until at least one code is read or `timeout` passes
pub fn scan_camera(camera_index: usize, timeout: Duration, json: bool) -> AppResult<()> {
    gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

    let backend = get_backend();
    let cameras = backend.enumerate_cameras();
    if cameras.is_empty() {
        return Err(CameraError::NoCameraFound.into());
    }
    let camera = cameras
        .get(camera_index)
        .ok_or(CameraError::InvalidIndex(camera_index))?;
    eprintln!("Using camera: {}", camera.name);

    let config = Config::default();
    let screen = ScannerScreen::new(
        ScannerOptions::from(&config),
        haptics::connect(app_info::APP_ID, config.haptics_enabled),
    )
    .on_read(|result: ScanResult| result);

    let (sender, mut receiver) = mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);
    let _pipeline = backend.start_preview(camera, sender)?;

    let detector = QrDetector::new();
    let deadline = Instant::now() + timeout;

    let rt = tokio::runtime::Runtime::new()?;
    let reads = rt.block_on(async {
        let mut last_detection: Option<Instant> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Vec::new();
            }

            let frame = match tokio::time::timeout(remaining, receiver.next()).await {
                Ok(Some(frame)) => frame,
                Ok(None) | Err(_) => return Vec::new(),
            };

            let now = Instant::now();
            if !screen.detection_due(last_detection, now) {
                continue;
            }
            last_detection = Some(now);

            let reads: Vec<ScanResult> = detector
                .detect(Arc::new(frame), FrameRegion::FULL)
                .await
                .into_iter()
                .filter_map(|result| screen.on_detection(result))
                .collect();

            if !reads.is_empty() {
                return reads;
            }
        }
    });

    if reads.is_empty() {
        return Err(AppError::Decode(format!(
            "No code read within {}s",
            timeout.as_secs()
        )));
    }

    print_results(&reads, json)
}

fn print_results(results: &[ScanResult], json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        for result in results {
            println!("{}", result.data);
        }
    }
    Ok(())
}
