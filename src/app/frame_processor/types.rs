// SPDX-License-Identifier: MPL-2.0

//! Core types for frame processing results

use chrono::{DateTime, Local};
use serde::Serialize;

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// The whole frame
    pub const FULL: FrameRegion = FrameRegion {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        if frame_width == 0 || frame_height == 0 {
            return Self::FULL;
        }
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }

    /// Clamp to the unit square
    pub fn clamped(&self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: (self.x + self.width).clamp(0.0, 1.0) - x,
            height: (self.y + self.height).clamp(0.0, 1.0) - y,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` inside a frame, always within bounds
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> (u32, u32, u32, u32) {
        let region = self.clamped();
        let x = (region.x * frame_width as f32).floor() as u32;
        let y = (region.y * frame_height as f32).floor() as u32;
        let right = ((region.x + region.width) * frame_width as f32).ceil() as u32;
        let bottom = ((region.y + region.height) * frame_height as f32).ceil() as u32;
        (
            x.min(frame_width),
            y.min(frame_height),
            right.min(frame_width).saturating_sub(x),
            bottom.min(frame_height).saturating_sub(y),
        )
    }
}

/// One decoded code, as delivered to the `on_read` handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Decoded text
    pub data: String,
    /// Where the code sits in the frame
    pub bounds: FrameRegion,
    pub detected_at: DateTime<Local>,
}

impl ScanResult {
    pub fn new(data: impl Into<String>, bounds: FrameRegion) -> Self {
        Self {
            data: data.into(),
            bounds,
            detected_at: Local::now(),
        }
    }
}
