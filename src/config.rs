// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{detection, overlay, slots};
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::iced::{Color, Size};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Parse a `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` color string
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    // from_str_radix alone would accept a leading sign
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    // Short forms repeat each nibble ("f" means "ff")
    let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);

    let (r, g, b, a) = match hex.len() {
        3 => (short(0)?, short(1)?, short(2)?, 255),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ),
        8 => (
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ),
        _ => return None,
    };

    Some(Color::from_rgba8(r, g, b, a as f32 / 255.0))
}

/// Resolve a configured color, falling back to a default on bad input
fn color_or(value: &str, fallback: &str, field: &'static str) -> Color {
    parse_hex_color(value).unwrap_or_else(|| {
        warn!(field, value, "Unparseable color, using default");
        parse_hex_color(fallback).unwrap_or(Color::TRANSPARENT)
    })
}

/// Text appearance for the hint label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: String,
    pub size: f32,
    pub background: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: overlay::HINT_TEXT_COLOR.to_string(),
            size: overlay::HINT_TEXT_SIZE,
            background: overlay::HINT_BACKGROUND_COLOR.to_string(),
        }
    }
}

impl TextStyle {
    pub fn color(&self) -> Color {
        color_or(&self.color, overlay::HINT_TEXT_COLOR, "hint_text_style.color")
    }

    pub fn background(&self) -> Color {
        color_or(
            &self.background,
            overlay::HINT_BACKGROUND_COLOR,
            "hint_text_style.background",
        )
    }
}

/// Styling for the header and footer slots of the scanner screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStyle {
    /// Slot height in logical pixels
    pub height: f32,
    /// Optional fill behind the slot content
    pub background: Option<String>,
}

impl SlotStyle {
    pub fn top() -> Self {
        Self {
            height: slots::TOP_HEIGHT,
            background: None,
        }
    }

    pub fn bottom() -> Self {
        Self {
            height: slots::BOTTOM_HEIGHT,
            background: Some(slots::BOTTOM_BACKGROUND.to_string()),
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.background
            .as_deref()
            .map(|value| color_or(value, "#00000000", "slot.background"))
    }
}

/// Everything the viewfinder overlay draws is derived from this structure.
///
/// The same instance is shared by the scanner screen (which hands the
/// rectangle dimensions to the camera collaborator) and the overlay, so the
/// detection window and the visible window always agree.
///
/// No field is validated. Negative sizes or a rectangle larger than the
/// container give a degenerate picture, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub mask_color: String,
    pub corner_color: String,
    pub border_color: String,
    /// Viewfinder window height
    pub rect_height: f32,
    /// Viewfinder window width
    pub rect_width: f32,
    /// Frame border around the window
    pub border_width: f32,
    /// Thickness of each corner bracket arm
    pub corner_border_width: f32,
    /// Length of each corner bracket arm
    pub corner_border_length: f32,
    /// Show a spinner inside the frame
    pub is_loading: bool,
    pub loading_color: String,
    /// Inset the frame border from the corner brackets
    pub is_corner_offset: bool,
    pub corner_offset_size: f32,
    /// Height reserved below the mask container
    pub bottom_height: f32,
    /// Duration of one scan bar sweep in milliseconds
    pub scan_bar_animate_time: u64,
    pub scan_bar_color: String,
    /// Image drawn instead of the solid scan bar
    pub scan_bar_image: Option<PathBuf>,
    pub scan_bar_height: f32,
    /// Horizontal inset of the scan bar on both sides
    pub scan_bar_margin: f32,
    /// `None` shows the localized default hint
    pub hint_text: Option<String>,
    pub hint_text_style: TextStyle,
    /// Distance between the hint label and the bottom of the mask container
    pub hint_text_position: f32,
    pub is_show_scan_bar: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mask_color: overlay::MASK_COLOR.to_string(),
            corner_color: overlay::CORNER_COLOR.to_string(),
            border_color: overlay::BORDER_COLOR.to_string(),
            rect_height: overlay::RECT_HEIGHT,
            rect_width: overlay::RECT_WIDTH,
            border_width: overlay::BORDER_WIDTH,
            corner_border_width: overlay::CORNER_BORDER_WIDTH,
            corner_border_length: overlay::CORNER_BORDER_LENGTH,
            is_loading: false,
            loading_color: overlay::LOADING_COLOR.to_string(),
            is_corner_offset: true,
            corner_offset_size: overlay::CORNER_OFFSET_SIZE,
            bottom_height: overlay::BOTTOM_HEIGHT,
            scan_bar_animate_time: overlay::SCAN_BAR_ANIMATE_TIME_MS,
            scan_bar_color: overlay::SCAN_BAR_COLOR.to_string(),
            scan_bar_image: None,
            scan_bar_height: overlay::SCAN_BAR_HEIGHT,
            scan_bar_margin: overlay::SCAN_BAR_MARGIN,
            hint_text: None,
            hint_text_style: TextStyle::default(),
            hint_text_position: overlay::HINT_TEXT_POSITION,
            is_show_scan_bar: true,
        }
    }
}

impl OverlayConfig {
    pub fn mask_color(&self) -> Color {
        color_or(&self.mask_color, overlay::MASK_COLOR, "mask_color")
    }

    pub fn corner_color(&self) -> Color {
        color_or(&self.corner_color, overlay::CORNER_COLOR, "corner_color")
    }

    pub fn border_color(&self) -> Color {
        color_or(&self.border_color, overlay::BORDER_COLOR, "border_color")
    }

    pub fn loading_color(&self) -> Color {
        color_or(&self.loading_color, overlay::LOADING_COLOR, "loading_color")
    }

    pub fn scan_bar_color(&self) -> Color {
        color_or(&self.scan_bar_color, overlay::SCAN_BAR_COLOR, "scan_bar_color")
    }

    /// Size of the frame border box, inset by the corner offset on each side
    pub fn border_size(&self) -> Size {
        let inset = self.corner_inset() * 2.0;
        Size::new(self.rect_width - inset, self.rect_height - inset)
    }

    /// Corner offset in effect (zero unless `is_corner_offset`)
    pub fn corner_inset(&self) -> f32 {
        if self.is_corner_offset {
            self.corner_offset_size
        } else {
            0.0
        }
    }

    /// Width of the scan bar image after the horizontal margins
    pub fn scan_bar_image_width(&self) -> f32 {
        self.rect_width - self.scan_bar_margin * 2.0
    }

    /// Hint label text, localized when not configured
    pub fn hint_text(&self) -> String {
        match &self.hint_text {
            Some(text) => text.clone(),
            None => crate::fl!("hint-text"),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Viewfinder overlay appearance
    pub overlay: OverlayConfig,
    /// Torch LED on while scanning
    pub torch_mode: bool,
    /// Last used camera device path
    pub last_camera_path: Option<String>,
    /// Vibrate through feedbackd on every read
    pub haptics_enabled: bool,
    /// Interval between frames sampled for detection, in milliseconds
    pub detection_interval_ms: u64,
    /// Header slot styling
    pub top_view_style: SlotStyle,
    /// Footer slot styling
    pub bottom_view_style: SlotStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            torch_mode: false,
            last_camera_path: None,
            haptics_enabled: true,
            detection_interval_ms: detection::INTERVAL_MS,
            top_view_style: SlotStyle::top(),
            bottom_view_style: SlotStyle::bottom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_long_forms() {
        let mask = parse_hex_color("#0000004D").unwrap();
        assert_eq!(mask.r, 0.0);
        assert!((mask.a - 77.0 / 255.0).abs() < 0.001);

        let corner = parse_hex_color("#22ff00").unwrap();
        assert!((corner.g - 1.0).abs() < 0.001);
        assert_eq!(corner.a, 1.0);
    }

    #[test]
    fn test_parse_hex_color_short_form() {
        let white = parse_hex_color("#fff").unwrap();
        assert_eq!(white, Color::WHITE);
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        assert!(parse_hex_color("red").is_none());
        assert!(parse_hex_color("#12345").is_none());
        assert!(parse_hex_color("#gggggg").is_none());
    }

    #[test]
    fn test_parse_hex_color_rejects_signs() {
        assert!(parse_hex_color("#+f+f+f").is_none());
        assert!(parse_hex_color("#-1-1-1").is_none());
        assert!(parse_hex_color("#+fff+ff").is_none());

        let config = OverlayConfig {
            scan_bar_color: "#+f+f+f".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.scan_bar_color(),
            parse_hex_color(overlay::SCAN_BAR_COLOR).unwrap()
        );
    }

    #[test]
    fn test_bad_color_falls_back_to_default() {
        let config = OverlayConfig {
            corner_color: "not a color".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.corner_color(),
            parse_hex_color(overlay::CORNER_COLOR).unwrap()
        );
    }

    #[test]
    fn test_border_size_respects_corner_offset() {
        let mut config = OverlayConfig::default();
        assert_eq!(config.border_size(), Size::new(198.0, 198.0));

        config.is_corner_offset = false;
        assert_eq!(config.border_size(), Size::new(200.0, 200.0));
    }

    #[test]
    fn test_scan_bar_image_width() {
        let config = OverlayConfig::default();
        assert_eq!(config.scan_bar_image_width(), 188.0);
    }

    #[test]
    fn test_overlay_config_partial_json_uses_defaults() {
        let config: OverlayConfig = serde_json::from_str(r#"{"rect_height": 300.0}"#).unwrap();
        assert_eq!(config.rect_height, 300.0);
        assert_eq!(config.rect_width, overlay::RECT_WIDTH);
        assert!(config.is_show_scan_bar);
    }
}
