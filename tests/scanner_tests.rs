// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the scanner screen's read path

use scanner::backends::haptics::HapticFeedback;
use scanner::{FrameRegion, OverlayConfig, ScanResult, ScannerOptions, ScannerScreen};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts pulses instead of vibrating
#[derive(Clone, Default)]
struct CountingHaptics(Arc<AtomicUsize>);

impl CountingHaptics {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl HapticFeedback for CountingHaptics {
    fn pulse(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn screen_with_counters() -> (ScannerScreen<String>, CountingHaptics, Rc<Cell<usize>>) {
    let haptics = CountingHaptics::default();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let screen = ScannerScreen::new(ScannerOptions::default(), Box::new(haptics.clone())).on_read(
        move |result: ScanResult| {
            counter.set(counter.get() + 1);
            result.data
        },
    );

    (screen, haptics, calls)
}

#[test]
fn test_detection_pulses_and_calls_handler_once() {
    let (screen, haptics, calls) = screen_with_counters();

    let message = screen.on_detection(ScanResult::new("ABC123", FrameRegion::FULL));

    assert_eq!(message.as_deref(), Some("ABC123"));
    assert_eq!(haptics.count(), 1);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_identical_detections_are_not_deduplicated() {
    let (screen, haptics, calls) = screen_with_counters();
    let payload = ScanResult::new("same", FrameRegion::FULL);

    let first = screen.on_detection(payload.clone());
    let second = screen.on_detection(payload);

    assert_eq!(first, second);
    assert_eq!(calls.get(), 2);
    assert_eq!(haptics.count(), 2);
}

#[test]
fn test_detection_without_handler_still_pulses() {
    let haptics = CountingHaptics::default();
    let screen: ScannerScreen<()> =
        ScannerScreen::new(ScannerOptions::default(), Box::new(haptics.clone()));

    let message = screen.on_detection(ScanResult::new("x", FrameRegion::FULL));

    assert!(message.is_none());
    assert_eq!(haptics.count(), 1);
}

#[test]
fn test_detection_window_tracks_overlay_config() {
    let options = ScannerOptions {
        overlay: OverlayConfig {
            rect_width: 250.0,
            rect_height: 180.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let screen: ScannerScreen<()> =
        ScannerScreen::new(options.clone(), Box::new(CountingHaptics::default()));

    let window = screen.detection_window();
    assert_eq!(window.width, 280.0);
    assert_eq!(window.height, 320.0);

    let mut screen = screen;
    let mut bigger = options;
    bigger.overlay.rect_height = 300.0;
    screen.set_options(bigger);
    assert_eq!(screen.detection_window().height, 440.0);
    assert_eq!(screen.overlay().config().rect_height, 300.0);
}

#[test]
fn test_set_options_keeps_measurements() {
    let (mut screen, _, _) = screen_with_counters();
    screen
        .overlay_mut()
        .on_container_layout(cosmic::iced::Size::new(320.0, 400.0));

    let mut options = screen.options().clone();
    options.overlay.corner_color = "#ffffff".to_string();
    screen.set_options(options);

    assert_eq!(screen.overlay().measured().container_width, 320.0);
    assert_eq!(screen.overlay().config().corner_color, "#ffffff");
}

#[test]
fn test_set_options_changes_detection_cadence() {
    let (mut screen, _, _) = screen_with_counters();
    let start = Instant::now();
    let later = start + Duration::from_millis(300);

    assert!(screen.detection_due(None, start));
    assert!(!screen.detection_due(Some(start), later));

    let mut options = screen.options().clone();
    options.detection_interval_ms = 250;
    screen.set_options(options);

    assert_eq!(screen.detection_interval(), Duration::from_millis(250));
    assert!(screen.detection_due(Some(start), later));
}
