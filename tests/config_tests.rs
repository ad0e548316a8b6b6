// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use scanner::config::{SlotStyle, parse_hex_color};
use scanner::{Config, OverlayConfig, ScannerOptions};

#[test]
fn test_overlay_config_defaults() {
    let config = OverlayConfig::default();

    assert_eq!(config.rect_width, 200.0);
    assert_eq!(config.rect_height, 200.0);
    assert_eq!(config.border_width, 0.0);
    assert_eq!(config.corner_border_width, 4.0);
    assert_eq!(config.corner_border_length, 20.0);
    assert!(config.is_corner_offset);
    assert_eq!(config.corner_offset_size, 1.0);
    assert_eq!(config.bottom_height, 100.0);
    assert_eq!(config.scan_bar_animate_time, 2500);
    assert_eq!(config.scan_bar_height, 1.5);
    assert_eq!(config.scan_bar_margin, 6.0);
    assert_eq!(config.hint_text_position, 130.0);
    assert!(config.is_show_scan_bar);
    assert!(!config.is_loading);
    assert!(config.scan_bar_image.is_none());
}

#[test]
fn test_default_colors_parse() {
    let config = OverlayConfig::default();
    for value in [
        &config.mask_color,
        &config.corner_color,
        &config.border_color,
        &config.loading_color,
        &config.scan_bar_color,
        &config.hint_text_style.color,
        &config.hint_text_style.background,
    ] {
        assert!(
            parse_hex_color(value).is_some(),
            "Default color {value} should parse"
        );
    }
}

#[test]
fn test_mask_color_is_translucent_black() {
    let mask = OverlayConfig::default().mask_color();
    assert_eq!((mask.r, mask.g, mask.b), (0.0, 0.0, 0.0));
    assert!(mask.a > 0.0 && mask.a < 1.0);
}

#[test]
fn test_configured_hint_text_is_used() {
    let config = OverlayConfig {
        hint_text: Some("Scan the ticket".to_string()),
        ..Default::default()
    };
    assert_eq!(config.hint_text(), "Scan the ticket");
}

#[test]
fn test_slot_defaults() {
    let config = Config::default();
    assert_eq!(config.top_view_style, SlotStyle::top());
    assert_eq!(config.bottom_view_style.height, 100.0);
    assert!(config.top_view_style.background().is_none());
    assert!(config.bottom_view_style.background().is_some());
}

#[test]
fn test_scanner_options_follow_config() {
    let mut config = Config::default();
    config.torch_mode = true;
    config.detection_interval_ms = 250;
    config.overlay.rect_width = 260.0;

    let options = ScannerOptions::from(&config);
    assert!(options.torch_mode);
    assert_eq!(options.detection_interval_ms, 250);
    assert_eq!(options.overlay.rect_width, 260.0);
    assert_eq!(options.bottom_view_style, config.bottom_view_style);
}

#[test]
fn test_config_json_roundtrip_keeps_overlay() {
    let mut config = Config::default();
    config.overlay.hint_text = Some("hello".to_string());
    config.overlay.corner_color = "#ff0000".to_string();

    let json = serde_json::to_string(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
