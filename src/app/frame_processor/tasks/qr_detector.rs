// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Decoding is delegated to the `rqrr` crate. This module only prepares the
//! frame (crop to the detection window, downscale, greyscale) and maps the
//! grid corners back to normalized frame coordinates.

use crate::app::frame_processor::types::{FrameRegion, ScanResult};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection;
use image::{GrayImage, RgbaImage, imageops};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Frames are downscaled before decoding; codes inside a viewfinder are
/// large enough to survive it.
#[derive(Debug, Clone, Copy)]
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
            max_dimension: detection::MAX_DIMENSION,
        }
    }

    /// Detect codes inside `region` of a camera frame
    ///
    /// The CPU-heavy part runs on the blocking pool.
    pub async fn detect(&self, frame: Arc<CameraFrame>, region: FrameRegion) -> Vec<ScanResult> {
        let detector = *self;

        tokio::task::spawn_blocking(move || {
            let Some(image) =
                RgbaImage::from_raw(frame.width, frame.height, frame.packed_rgba())
            else {
                warn!(
                    width = frame.width,
                    height = frame.height,
                    "Frame data does not match its dimensions"
                );
                return Vec::new();
            };
            detector.detect_rgba(&image, region)
        })
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "QR detection task panicked");
            Vec::new()
        })
    }

    /// Synchronous detection on an RGBA image
    pub fn detect_rgba(&self, image: &RgbaImage, region: FrameRegion) -> Vec<ScanResult> {
        let start = std::time::Instant::now();
        let (frame_width, frame_height) = image.dimensions();

        let (crop_x, crop_y, crop_width, crop_height) = region.to_pixels(frame_width, frame_height);
        if crop_width == 0 || crop_height == 0 {
            return Vec::new();
        }

        let cropped = imageops::crop_imm(image, crop_x, crop_y, crop_width, crop_height).to_image();
        let gray = imageops::grayscale(&cropped);

        let scale = (crop_width as f32 / self.max_dimension as f32)
            .max(crop_height as f32 / self.max_dimension as f32)
            .max(1.0);
        let gray = if scale > 1.0 {
            let width = ((crop_width as f32 / scale) as u32).max(1);
            let height = ((crop_height as f32 / scale) as u32).max(1);
            imageops::resize(&gray, width, height, imageops::FilterType::Triangle)
        } else {
            gray
        };

        trace!(
            width = gray.width(),
            height = gray.height(),
            scale,
            prepare_ms = start.elapsed().as_millis(),
            "Prepared greyscale image"
        );

        let results: Vec<ScanResult> = decode_grids(&gray)
            .into_iter()
            .map(|(content, min_x, min_y, max_x, max_y)| {
                // Undo downscale and crop, then normalize against the full frame
                let x = crop_x as f32 + min_x * scale;
                let y = crop_y as f32 + min_y * scale;
                let bounds = FrameRegion::from_pixels(
                    x as u32,
                    y as u32,
                    ((max_x - min_x) * scale) as u32,
                    ((max_y - min_y) * scale) as u32,
                    frame_width,
                    frame_height,
                );

                debug!(
                    content = %content,
                    x = bounds.x,
                    y = bounds.y,
                    "Detected QR code"
                );
                ScanResult::new(content, bounds)
            })
            .collect();

        if !results.is_empty() {
            debug!(
                count = results.len(),
                total_ms = start.elapsed().as_millis(),
                "QR detection found codes"
            );
        }

        results
    }
}

/// Run rqrr over a greyscale image, returning content and the axis-aligned
/// bounding box of each decodable grid
fn decode_grids(gray: &GrayImage) -> Vec<(String, f32, f32, f32, f32)> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );

    prepared
        .detect_grids()
        .into_iter()
        .filter_map(|grid| {
            let (_meta, content) = match grid.decode() {
                Ok(decoded) => decoded,
                Err(e) => {
                    debug!(error = ?e, "Failed to decode QR grid");
                    return None;
                }
            };

            let xs = grid.bounds.iter().map(|p| p.x as f32);
            let ys = grid.bounds.iter().map(|p| p.y as f32);
            let min_x = xs.clone().fold(f32::MAX, f32::min).max(0.0);
            let max_x = xs.fold(f32::MIN, f32::max);
            let min_y = ys.clone().fold(f32::MAX, f32::min).max(0.0);
            let max_y = ys.fold(f32::MIN, f32::max);

            Some((content, min_x, min_y, max_x, max_y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_has_no_codes() {
        let image = RgbaImage::from_pixel(320, 240, image::Rgba([255, 255, 255, 255]));
        let results = QrDetector::new().detect_rgba(&image, FrameRegion::FULL);
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_region_short_circuits() {
        let image = RgbaImage::from_pixel(64, 64, image::Rgba([0, 0, 0, 255]));
        let region = FrameRegion {
            x: 0.5,
            y: 0.5,
            width: 0.0,
            height: 0.0,
        };
        assert!(QrDetector::new().detect_rgba(&image, region).is_empty());
    }

    #[tokio::test]
    async fn test_async_detect_rejects_mismatched_frame() {
        let frame = CameraFrame::from_rgba(16, 16, vec![0; 10]);
        let results = QrDetector::new()
            .detect(Arc::new(frame), FrameRegion::FULL)
            .await;
        assert!(results.is_empty());
    }
}
