// SPDX-License-Identifier: GPL-3.0-only

//! Scanner screen
//!
//! Composition root of a scanning view: the camera preview fills the area,
//! the header and footer slots sit on top, and the viewfinder overlay is
//! drawn between them. Every detection is forwarded to the `on_read`
//! handler right after a haptic pulse. Identical payloads are forwarded
//! every time they are seen.

use crate::app::frame_processor::{FrameRegion, ScanResult};
use crate::app::viewfinder::{LayoutEvent, ViewfinderOverlay, viewfinder_bounds};
use crate::backends::haptics::HapticFeedback;
use crate::backends::torch::{self, TorchDevice, TorchMode};
use crate::config::{Config, OverlayConfig, SlotStyle};
use crate::constants::detection;
use cosmic::iced::{Background, Length, Rectangle, Size};
use cosmic::{Element, widget};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Options of a scanner screen
///
/// The overlay config is the single description of the viewfinder; the
/// detection window is derived from the same instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerOptions {
    pub torch_mode: bool,
    pub overlay: OverlayConfig,
    pub top_view_style: SlotStyle,
    pub bottom_view_style: SlotStyle,
    /// How often frames are sampled for detection, in milliseconds
    pub detection_interval_ms: u64,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ScannerOptions {
    fn from(config: &Config) -> Self {
        Self {
            torch_mode: config.torch_mode,
            overlay: config.overlay.clone(),
            top_view_style: config.top_view_style.clone(),
            bottom_view_style: config.bottom_view_style.clone(),
            detection_interval_ms: config.detection_interval_ms,
        }
    }
}

/// Area of the preview searched for codes, in screen units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionWindow {
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    pub border_width: f32,
}

impl DetectionWindow {
    pub fn for_overlay(config: &OverlayConfig) -> Self {
        Self {
            width: config.rect_width + detection::WINDOW_EXTRA_WIDTH,
            height: config.rect_height + detection::WINDOW_EXTRA_HEIGHT,
            visible: true,
            border_width: 0.0,
        }
    }
}

/// Where a frame of `frame_width × frame_height` lands when it covers
/// `container` (scaled to fill, overflow cropped evenly)
pub fn cover_bounds(container: Size, frame_width: u32, frame_height: u32) -> Rectangle {
    let scale = (container.width / frame_width as f32).max(container.height / frame_height as f32);
    let width = frame_width as f32 * scale;
    let height = frame_height as f32 * scale;
    Rectangle {
        x: (container.width - width) / 2.0,
        y: (container.height - height) / 2.0,
        width,
        height,
    }
}

pub struct ScannerScreen<M> {
    options: ScannerOptions,
    overlay: ViewfinderOverlay,
    haptics: Box<dyn HapticFeedback>,
    torch_devices: Vec<TorchDevice>,
    on_read: Option<Box<dyn Fn(ScanResult) -> M>>,
}

impl<M> ScannerScreen<M> {
    pub fn new(options: ScannerOptions, haptics: Box<dyn HapticFeedback>) -> Self {
        let overlay = ViewfinderOverlay::new(options.overlay.clone());
        Self {
            options,
            overlay,
            haptics,
            torch_devices: Vec::new(),
            on_read: None,
        }
    }

    /// Handler invoked once per detected code
    pub fn on_read(mut self, on_read: impl Fn(ScanResult) -> M + 'static) -> Self {
        self.on_read = Some(Box::new(on_read));
        self
    }

    /// Torch LEDs driven by [`set_torch`](Self::set_torch)
    pub fn with_torch_devices(mut self, devices: Vec<TorchDevice>) -> Self {
        self.torch_devices = devices;
        self
    }

    pub fn options(&self) -> &ScannerOptions {
        &self.options
    }

    /// Apply new options, keeping the overlay measurements and animation
    pub fn set_options(&mut self, options: ScannerOptions) {
        if options.overlay != self.options.overlay {
            self.overlay.set_config(options.overlay.clone());
        }
        let torch_changed = options.torch_mode != self.options.torch_mode;
        self.options = options;
        if torch_changed {
            self.apply_torch();
        }
    }

    pub fn overlay(&self) -> &ViewfinderOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut ViewfinderOverlay {
        &mut self.overlay
    }

    pub fn set_haptics(&mut self, haptics: Box<dyn HapticFeedback>) {
        self.haptics = haptics;
    }

    /// Handle one detection: pulse, then hand the payload to `on_read`
    ///
    /// The returned message is meant to be dispatched immediately.
    pub fn on_detection(&self, payload: ScanResult) -> Option<M> {
        debug!(data = %payload.data, "Code detected");
        self.haptics.pulse();
        self.on_read.as_ref().map(|on_read| on_read(payload))
    }

    pub fn torch_mode(&self) -> TorchMode {
        TorchMode::from(self.options.torch_mode)
    }

    pub fn set_torch(&mut self, enabled: bool) {
        self.options.torch_mode = enabled;
        self.apply_torch();
    }

    fn apply_torch(&self) {
        let mode = self.torch_mode();
        info!(?mode, devices = self.torch_devices.len(), "Applying torch mode");
        torch::apply_all(&self.torch_devices, mode);
    }

    /// Time between detection passes
    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.options.detection_interval_ms)
    }

    /// Whether a detection pass may start at `now`, given when the last one did
    pub fn detection_due(&self, last: Option<Instant>, now: Instant) -> bool {
        last.is_none_or(|t| now.saturating_duration_since(t) >= self.detection_interval())
    }

    /// Window handed to the detector, slightly larger than the viewfinder
    pub fn detection_window(&self) -> DetectionWindow {
        DetectionWindow::for_overlay(self.overlay.config())
    }

    /// Part of a frame to search, given the size of the preview area
    ///
    /// The window is centred on the viewfinder. Until the area is known the
    /// whole frame is searched.
    pub fn frame_region(&self, area: Size, frame_width: u32, frame_height: u32) -> FrameRegion {
        if area.width <= 0.0 || area.height <= 0.0 || frame_width == 0 || frame_height == 0 {
            return FrameRegion::FULL;
        }

        let window = self.detection_window();
        let viewfinder = viewfinder_bounds(area, self.overlay.config());
        let center_x = viewfinder.x + viewfinder.width / 2.0;
        let center_y = viewfinder.y + viewfinder.height / 2.0;
        let video = cover_bounds(area, frame_width, frame_height);

        FrameRegion {
            x: (center_x - window.width / 2.0 - video.x) / video.width,
            y: (center_y - window.height / 2.0 - video.y) / video.height,
            width: window.width / video.width,
            height: window.height / video.height,
        }
        .clamped()
    }

    /// Stack the preview, header slot, overlay and footer slot
    pub fn view<'a>(
        &'a self,
        preview: Element<'a, M>,
        top: Option<Element<'a, M>>,
        bottom: Option<Element<'a, M>>,
        on_layout: fn(LayoutEvent) -> M,
    ) -> Element<'a, M>
    where
        M: Clone + 'a,
    {
        let top_slot = slot(top, &self.options.top_view_style);
        let bottom_slot = slot(bottom, &self.options.bottom_view_style);

        let chrome = widget::column()
            .push(top_slot)
            .push(widget::Space::new(Length::Fill, Length::Fill))
            .push(bottom_slot)
            .width(Length::Fill)
            .height(Length::Fill);

        cosmic::iced::widget::stack![preview, self.overlay.view(on_layout), chrome]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// A fixed-height band holding caller content
fn slot<'a, M: 'a>(content: Option<Element<'a, M>>, style: &SlotStyle) -> Element<'a, M> {
    let content = content.unwrap_or_else(|| widget::Space::new(Length::Fill, Length::Fill).into());
    let background = style.background();

    widget::container(content)
        .width(Length::Fill)
        .height(Length::Fixed(style.height.max(0.0)))
        .style(move |_theme| widget::container::Style {
            background: background.map(Background::Color),
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::haptics::SilentHaptics;

    #[test]
    fn test_detection_window_padding() {
        let screen: ScannerScreen<()> =
            ScannerScreen::new(ScannerOptions::default(), Box::new(SilentHaptics));
        let window = screen.detection_window();
        assert_eq!(window.width, 230.0);
        assert_eq!(window.height, 340.0);
        assert!(window.visible);
        assert_eq!(window.border_width, 0.0);
    }

    #[test]
    fn test_cover_bounds_crop_evenly() {
        // 4:3 frame on a square area: width overflows
        let video = cover_bounds(Size::new(300.0, 300.0), 400, 300);
        assert_eq!(video.height, 300.0);
        assert_eq!(video.width, 400.0);
        assert_eq!(video.x, -50.0);
        assert_eq!(video.y, 0.0);
    }

    #[test]
    fn test_frame_region_before_layout_is_full() {
        let screen: ScannerScreen<()> =
            ScannerScreen::new(ScannerOptions::default(), Box::new(SilentHaptics));
        assert_eq!(screen.frame_region(Size::ZERO, 640, 480), FrameRegion::FULL);
        assert_eq!(
            screen.frame_region(Size::new(400.0, 600.0), 0, 0),
            FrameRegion::FULL
        );
    }

    #[test]
    fn test_frame_region_centres_on_viewfinder() {
        let screen: ScannerScreen<()> =
            ScannerScreen::new(ScannerOptions::default(), Box::new(SilentHaptics));
        // Frame matches the area exactly, so screen units are frame pixels
        let region = screen.frame_region(Size::new(460.0, 780.0), 460, 780);
        // Viewfinder centre: (230, 340); window 230 × 340
        assert!((region.x - 115.0 / 460.0).abs() < 1e-4);
        assert!((region.y - 170.0 / 780.0).abs() < 1e-4);
        assert!((region.width - 0.5).abs() < 1e-4);
        assert!((region.height - 340.0 / 780.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_torch_updates_mode() {
        let mut screen: ScannerScreen<()> =
            ScannerScreen::new(ScannerOptions::default(), Box::new(SilentHaptics));
        assert_eq!(screen.torch_mode(), TorchMode::Off);
        screen.set_torch(true);
        assert_eq!(screen.torch_mode(), TorchMode::On);
        assert!(screen.options().torch_mode);
    }
}
