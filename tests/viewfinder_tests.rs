// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the viewfinder overlay geometry and scan bar

use cosmic::iced::{Point, Rectangle, Size};
use scanner::app::viewfinder::{
    ScanBarAnimation, ViewfinderOverlay, compute_mask_geometry, viewfinder_bounds,
};
use scanner::{MeasuredLayout, OverlayConfig};
use std::time::{Duration, Instant};

fn layout(width: f32, top: f32, left: f32) -> MeasuredLayout {
    MeasuredLayout {
        container_width: width,
        top_offset: top,
        left_offset: left,
    }
}

fn configs() -> Vec<OverlayConfig> {
    let mut out = Vec::new();
    for (width, height) in [(200.0, 200.0), (280.0, 120.0), (150.0, 300.0)] {
        for offset in [1.0, 3.5, 10.0] {
            out.push(OverlayConfig {
                rect_width: width,
                rect_height: height,
                corner_offset_size: offset,
                ..Default::default()
            });
        }
    }
    out
}

#[test]
fn test_side_masks_without_corner_offset() {
    for mut config in configs() {
        config.is_corner_offset = false;
        for (top, left) in [(0.0, 0.0), (50.0, 80.0), (123.5, 17.25)] {
            let geometry = compute_mask_geometry(&config, &layout(400.0, top, left));
            assert_eq!(geometry.side_mask_height, config.rect_height);
            assert_eq!(geometry.side_mask_width, left);
        }
    }
}

#[test]
fn test_corner_offset_shifts_edges_by_offset_size() {
    for config in configs() {
        let plain = OverlayConfig {
            is_corner_offset: false,
            ..config.clone()
        };
        for (top, left) in [(0.0, 0.0), (50.0, 80.0), (210.0, 33.0)] {
            let measured = layout(400.0, top, left);
            let with = compute_mask_geometry(&config, &measured);
            let without = compute_mask_geometry(&plain, &measured);
            let size = config.corner_offset_size;

            assert_eq!(with.side_mask_height, config.rect_height - 2.0 * size);
            assert_eq!(with.top_mask_bottom, without.top_mask_bottom - size);
            assert_eq!(with.bottom_mask_top, without.bottom_mask_top - size);
            assert_eq!(with.side_mask_width, without.side_mask_width + size);
        }
    }
}

#[test]
fn test_top_mask_edge_scenario() {
    let config = OverlayConfig::default();
    let geometry = compute_mask_geometry(&config, &layout(360.0, 50.0, 80.0));
    assert_eq!(geometry.top_mask_bottom, 249.0);
    assert_eq!(geometry.bottom_mask_top, 249.0);
    assert_eq!(geometry.mask_width, 360.0);
}

#[test]
fn test_geometry_before_measurement_does_not_fail() {
    let overlay = ViewfinderOverlay::new(OverlayConfig::default());
    assert_eq!(*overlay.measured(), MeasuredLayout::default());

    let geometry = overlay.compute_mask_geometry();
    assert_eq!(geometry.mask_width, 0.0);

    let panels = geometry.panels(0.0);
    for panel in panels.iter() {
        assert!(panel.width >= 0.0);
        assert!(panel.height >= 0.0);
    }
    assert_eq!(panels.top.width, 0.0);
    assert_eq!(panels.bottom.width, 0.0);
}

#[test]
fn test_measured_viewfinder_reproduces_centred_layout() {
    let config = OverlayConfig::default();
    let area = Size::new(360.0, 740.0);
    let viewfinder = viewfinder_bounds(area, &config);

    let mut overlay = ViewfinderOverlay::new(config);
    overlay.on_container_layout(Size::new(360.0, 640.0));
    overlay.on_viewfinder_layout(viewfinder);

    let geometry = overlay.compute_mask_geometry();
    assert_eq!(viewfinder.position(), Point::new(80.0, 220.0));
    assert_eq!(geometry.top_mask_bottom, 419.0);
    assert_eq!(geometry.side_mask_width, 81.0);
    // Top and bottom panels are equally tall around a centred window
    let panels = geometry.panels(640.0);
    assert_eq!(panels.top.height, 640.0 - panels.bottom.y);
}

#[test]
fn test_layout_callbacks_overwrite_previous_values() {
    let mut overlay = ViewfinderOverlay::new(OverlayConfig::default());
    overlay.on_viewfinder_layout(Rectangle::new(Point::new(10.0, 20.0), Size::new(200.0, 200.0)));
    overlay.on_viewfinder_layout(Rectangle::new(Point::new(30.0, 40.0), Size::new(200.0, 200.0)));
    overlay.on_container_layout(Size::new(500.0, 10.0));

    assert_eq!(*overlay.measured(), layout(500.0, 40.0, 30.0));
}

#[test]
fn test_scan_bar_cycle_scenario() {
    let t0 = Instant::now();
    let ms = Duration::from_millis;
    let mut anim = ScanBarAnimation::start(200.0, ms(2500), t0);

    assert_eq!(anim.tick(t0), 0.0);
    assert!((anim.tick(t0 + ms(1250)) - 100.0).abs() < 0.01);
    assert_eq!(anim.tick(t0 + ms(2500)), 200.0);

    // State after the cycle matches the state at its start
    assert_eq!(anim.offset(), 0.0);
    assert_eq!(anim.cycle_start(), t0 + ms(2500));
    assert_eq!(anim.cycles(), 1);

    // Next cycle repeats identically
    assert!((anim.tick(t0 + ms(3750)) - 100.0).abs() < 0.01);
    assert_eq!(anim.tick(t0 + ms(5000)), 200.0);
    assert_eq!(anim.offset(), 0.0);
    assert_eq!(anim.cycle_start(), t0 + ms(5000));
}

#[test]
fn test_scan_bar_does_not_drift() {
    let t0 = Instant::now();
    let period = Duration::from_millis(2500);
    let mut anim = ScanBarAnimation::start(200.0, period, t0);

    // Ticks at a frame step that does not divide the period
    let step = Duration::from_millis(17);
    let mut now = t0;
    while now < t0 + period * 40 {
        now += step;
        anim.tick(now);
    }

    let expected = (now - t0).as_millis() / period.as_millis();
    assert_eq!(u128::from(anim.cycles()), expected);
    assert_eq!(anim.cycle_start(), t0 + period * expected as u32);
}

#[test]
fn test_tick_after_unmount_is_noop() {
    let mut overlay = ViewfinderOverlay::new(OverlayConfig::default());
    let start = Instant::now();
    let before = overlay.scan_bar_offset();

    overlay.unmount();
    assert!(!overlay.is_mounted());
    assert!(overlay.timer().is_cancelled());
    assert_eq!(overlay.scan_bar_tick(start + Duration::from_millis(1000)), before);
    assert_eq!(overlay.scan_bar_offset(), before);
}

#[test]
fn test_zero_duration_keeps_bar_at_top() {
    let config = OverlayConfig {
        scan_bar_animate_time: 0,
        ..Default::default()
    };
    let mut overlay = ViewfinderOverlay::new(config);
    assert_eq!(overlay.scan_bar_tick(Instant::now() + Duration::from_secs(3)), 0.0);
}
