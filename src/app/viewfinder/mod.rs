// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder overlay
//!
//! Darkens everything outside a rectangular window, draws corner brackets at
//! the window corners and sweeps a scan bar through it. All geometry is a
//! pure function of [`OverlayConfig`] and the last [`MeasuredLayout`], so it
//! can be computed (and tested) without a renderer.
//!
//! ```text
//! ┌──────────────── container ────────────────┐
//! │                 top panel                 │
//! ├────────┬─────────────────────────┬────────┤
//! │  left  │ ┌─      viewfinder    ─┐ │ right  │
//! │ panel  │ │   ───── scan bar ──  │ │ panel  │
//! │        │ └─                    ─┘ │        │
//! ├────────┴─────────────────────────┴────────┤
//! │               bottom panel                │
//! └───────────────────────────────────────────┘
//!                 bottom_height
//! ```

pub mod animation;
mod widget;

pub use animation::{ScanBarAnimation, ScanBarTimer};
pub use widget::ViewfinderWidget;

use crate::config::OverlayConfig;
use crate::constants::overlay;
use cosmic::iced::{Background, Color, Length, Point, Rectangle, Size};
use cosmic::{Element, widget as cosmic_widget};
use std::time::{Duration, Instant};
use tracing::debug;

/// Step of the loading spinner
const SPINNER_STEP: Duration = Duration::from_millis(100);

/// Colors resolved once per config change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub mask: Color,
    pub corner: Color,
    pub border: Color,
    pub loading: Color,
    pub scan_bar: Color,
    pub hint_text: Color,
    pub hint_background: Color,
}

impl From<&OverlayConfig> for Palette {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            mask: config.mask_color(),
            corner: config.corner_color(),
            border: config.border_color(),
            loading: config.loading_color(),
            scan_bar: config.scan_bar_color(),
            hint_text: config.hint_text_style.color(),
            hint_background: config.hint_text_style.background(),
        }
    }
}

/// Offsets captured from layout events
///
/// Zero until the first layout pass; never cleared afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasuredLayout {
    pub container_width: f32,
    /// Viewfinder top edge, relative to the container
    pub top_offset: f32,
    /// Viewfinder left edge, relative to the container
    pub left_offset: f32,
}

/// Layout change published by the overlay widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutEvent {
    /// Whole overlay area, bottom band included
    Area(Size),
    /// Area above the bottom band
    Container(Size),
    Viewfinder(Rectangle),
}

/// Extents of the four mask panels
///
/// Edges are stored the way they are anchored: the top panel hangs from the
/// container top and its lower edge is `top_mask_bottom` above the container
/// bottom, the bottom panel starts `bottom_mask_top` below the container top.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaskGeometry {
    pub top_mask_bottom: f32,
    pub bottom_mask_top: f32,
    pub side_mask_height: f32,
    pub side_mask_width: f32,
    pub mask_width: f32,
}

/// Absolute rectangles of the mask panels inside the container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPanels {
    pub top: Rectangle,
    pub bottom: Rectangle,
    pub left: Rectangle,
    pub right: Rectangle,
}

impl MaskPanels {
    pub fn iter(&self) -> impl Iterator<Item = Rectangle> {
        [self.top, self.bottom, self.left, self.right].into_iter()
    }
}

impl MaskGeometry {
    /// Resolve the panels for a container of the given height
    ///
    /// Negative extents are clamped to zero.
    pub fn panels(&self, container_height: f32) -> MaskPanels {
        let width = self.mask_width.max(0.0);
        let side_width = self.side_mask_width.max(0.0);
        let side_height = self.side_mask_height.max(0.0);
        let side_y = (container_height - self.side_mask_height) / 2.0;

        MaskPanels {
            top: Rectangle {
                x: 0.0,
                y: 0.0,
                width,
                height: (container_height - self.top_mask_bottom).max(0.0),
            },
            bottom: Rectangle {
                x: 0.0,
                y: self.bottom_mask_top,
                width,
                height: (container_height - self.bottom_mask_top).max(0.0),
            },
            left: Rectangle {
                x: 0.0,
                y: side_y,
                width: side_width,
                height: side_height,
            },
            right: Rectangle {
                x: self.mask_width - self.side_mask_width,
                y: side_y,
                width: side_width,
                height: side_height,
            },
        }
    }
}

/// Mask geometry for a config and the last measured layout
pub fn compute_mask_geometry(config: &OverlayConfig, layout: &MeasuredLayout) -> MaskGeometry {
    let inset = config.corner_inset();
    let edge = layout.top_offset + config.rect_height - inset;

    MaskGeometry {
        top_mask_bottom: edge,
        bottom_mask_top: edge,
        side_mask_height: config.rect_height - 2.0 * inset,
        side_mask_width: layout.left_offset + inset,
        mask_width: layout.container_width,
    }
}

/// Area the mask panels cover: everything above the bottom band
pub fn container_size(area: Size, config: &OverlayConfig) -> Size {
    Size::new(area.width, (area.height - config.bottom_height).max(0.0))
}

/// Viewfinder window centred in the container, relative to `area`'s origin
pub fn viewfinder_bounds(area: Size, config: &OverlayConfig) -> Rectangle {
    let container = container_size(area, config);
    Rectangle {
        x: (container.width - config.rect_width) / 2.0,
        y: (container.height - config.rect_height) / 2.0,
        width: config.rect_width,
        height: config.rect_height,
    }
}

/// Frame border box, inset from the viewfinder by the corner offset
pub fn border_box(viewfinder: Rectangle, config: &OverlayConfig) -> Rectangle {
    let size = config.border_size();
    Rectangle {
        x: viewfinder.x + (viewfinder.width - size.width) / 2.0,
        y: viewfinder.y + (viewfinder.height - size.height) / 2.0,
        width: size.width,
        height: size.height,
    }
}

/// Where the scan bar is drawn for a given animation offset
///
/// The bar sits inside the frame border. A solid bar is inset by the margin
/// on both sides; an image starts at the content edge with its own width.
pub fn scan_bar_bounds(border_box: Rectangle, config: &OverlayConfig, offset: f32) -> Rectangle {
    let content_x = border_box.x + config.border_width;
    let content_y = border_box.y + config.border_width;

    if config.scan_bar_image.is_some() {
        Rectangle {
            x: content_x,
            y: content_y + offset,
            width: config.scan_bar_image_width().max(0.0),
            height: config.scan_bar_height.max(0.0),
        }
    } else {
        let content_width = border_box.width - 2.0 * config.border_width;
        Rectangle {
            x: content_x + config.scan_bar_margin,
            y: content_y + offset,
            width: (content_width - 2.0 * config.scan_bar_margin).max(0.0),
            height: config.scan_bar_height.max(0.0),
        }
    }
}

/// One L-shaped corner bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerBracket {
    pub horizontal: Rectangle,
    pub vertical: Rectangle,
}

/// Brackets for the four corners, in top-left, top-right, bottom-left,
/// bottom-right order
pub fn corner_brackets(viewfinder: Rectangle, length: f32, thickness: f32) -> [CornerBracket; 4] {
    let length = length.max(0.0);
    let thickness = thickness.max(0.0);
    let left = viewfinder.x;
    let top = viewfinder.y;
    let right = viewfinder.x + viewfinder.width;
    let bottom = viewfinder.y + viewfinder.height;

    let bracket = |x: f32, y: f32, at_right: bool, at_bottom: bool| {
        let hx = if at_right { x - length } else { x };
        let hy = if at_bottom { y - thickness } else { y };
        let vx = if at_right { x - thickness } else { x };
        let vy = if at_bottom { y - length } else { y };
        CornerBracket {
            horizontal: Rectangle {
                x: hx,
                y: hy,
                width: length,
                height: thickness,
            },
            vertical: Rectangle {
                x: vx,
                y: vy,
                width: thickness,
                height: length,
            },
        }
    };

    [
        bracket(left, top, false, false),
        bracket(right, top, true, false),
        bracket(left, bottom, false, true),
        bracket(right, bottom, true, true),
    ]
}

/// Loading spinner dots around `center` with their opacity
///
/// The dot at `step` is fully opaque, the ones behind it fade out.
pub fn spinner_dots(center: Point, step: usize) -> Vec<(Rectangle, f32)> {
    let count = overlay::SPINNER_DOTS;
    let half = overlay::SPINNER_DOT_SIZE / 2.0;

    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let x = center.x + overlay::SPINNER_RADIUS * angle.sin();
            let y = center.y - overlay::SPINNER_RADIUS * angle.cos();
            let age = (step + count - i) % count;
            let alpha = 1.0 - age as f32 / count as f32;
            (
                Rectangle {
                    x: x - half,
                    y: y - half,
                    width: overlay::SPINNER_DOT_SIZE,
                    height: overlay::SPINNER_DOT_SIZE,
                },
                alpha,
            )
        })
        .collect()
}

fn sweep_duration(config: &OverlayConfig) -> Duration {
    Duration::from_millis(config.scan_bar_animate_time)
}

/// The overlay component: config, measurements and the running scan bar
#[derive(Debug)]
pub struct ViewfinderOverlay {
    config: OverlayConfig,
    palette: Palette,
    layout: MeasuredLayout,
    scan_bar: ScanBarAnimation,
    scan_bar_image: Option<cosmic_widget::image::Handle>,
    mounted_at: Instant,
    spinner_step: usize,
    mounted: bool,
}

impl ViewfinderOverlay {
    /// Mount the overlay; the scan bar starts its first sweep now
    pub fn new(config: OverlayConfig) -> Self {
        let now = Instant::now();
        let scan_bar = ScanBarAnimation::start(config.rect_height, sweep_duration(&config), now);
        let scan_bar_image = config
            .scan_bar_image
            .as_ref()
            .map(cosmic_widget::image::Handle::from_path);

        debug!(
            timer = scan_bar.timer().id(),
            rect_width = config.rect_width,
            rect_height = config.rect_height,
            "Viewfinder overlay mounted"
        );

        Self {
            palette: Palette::from(&config),
            config,
            layout: MeasuredLayout::default(),
            scan_bar,
            scan_bar_image,
            mounted_at: now,
            spinner_step: 0,
            mounted: true,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Replace the config; measurements and the running sweep are kept
    pub fn set_config(&mut self, config: OverlayConfig) {
        if config.scan_bar_image != self.config.scan_bar_image {
            self.scan_bar_image = config
                .scan_bar_image
                .as_ref()
                .map(cosmic_widget::image::Handle::from_path);
        }
        self.scan_bar.retarget(config.rect_height, sweep_duration(&config));
        self.palette = Palette::from(&config);
        self.config = config;
    }

    pub fn measured(&self) -> &MeasuredLayout {
        &self.layout
    }

    /// Record the container width
    pub fn on_container_layout(&mut self, size: Size) {
        self.layout.container_width = size.width;
    }

    /// Record the viewfinder position within the container
    pub fn on_viewfinder_layout(&mut self, rect: Rectangle) {
        self.layout.top_offset = rect.y;
        self.layout.left_offset = rect.x;
    }

    /// Apply a layout event published by the widget
    pub fn on_layout(&mut self, event: LayoutEvent) {
        match event {
            // Only the embedding screen needs the full area
            LayoutEvent::Area(_) => {}
            LayoutEvent::Container(size) => self.on_container_layout(size),
            LayoutEvent::Viewfinder(rect) => self.on_viewfinder_layout(rect),
        }
    }

    pub fn compute_mask_geometry(&self) -> MaskGeometry {
        compute_mask_geometry(&self.config, &self.layout)
    }

    /// Advance the scan bar (and spinner) to `now`
    pub fn scan_bar_tick(&mut self, now: Instant) -> f32 {
        if !self.mounted {
            return self.scan_bar.position();
        }
        let elapsed = now.saturating_duration_since(self.mounted_at);
        self.spinner_step =
            (elapsed.as_millis() / SPINNER_STEP.as_millis()) as usize % overlay::SPINNER_DOTS;
        self.scan_bar.tick(now)
    }

    /// Offset the scan bar is currently drawn at
    pub fn scan_bar_offset(&self) -> f32 {
        self.scan_bar.position()
    }

    pub fn scan_bar(&self) -> &ScanBarAnimation {
        &self.scan_bar
    }

    pub fn timer(&self) -> &ScanBarTimer {
        self.scan_bar.timer()
    }

    /// Whether the overlay needs animation ticks
    pub fn is_animating(&self) -> bool {
        self.mounted && (self.config.is_show_scan_bar || self.config.is_loading)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Stop the scan bar; later ticks are ignored
    pub fn unmount(&mut self) {
        if self.mounted {
            self.mounted = false;
            self.scan_bar.cancel();
            debug!(timer = self.scan_bar.timer().id(), "Viewfinder overlay unmounted");
        }
    }

    /// Overlay element: masks, frame, scan bar and spinner, with the hint
    /// label stacked on top
    pub fn view<'a, M>(&'a self, on_layout: fn(LayoutEvent) -> M) -> Element<'a, M>
    where
        M: Clone + 'a,
    {
        let scan_bar_image: Option<Element<'a, M>> = if self.config.is_show_scan_bar {
            self.scan_bar_image.as_ref().map(|handle| {
                cosmic_widget::image(handle.clone())
                    .width(Length::Fixed(self.config.scan_bar_image_width().max(0.0)))
                    .content_fit(cosmic::iced::ContentFit::Fill)
                    .into()
            })
        } else {
            None
        };

        let drawing = ViewfinderWidget::new(
            &self.config,
            self.palette,
            self.compute_mask_geometry(),
            self.scan_bar_offset(),
            self.spinner_step,
            scan_bar_image,
            on_layout,
        );

        let text_color = self.palette.hint_text;
        let background = self.palette.hint_background;
        let hint = cosmic_widget::container(
            cosmic_widget::text(self.config.hint_text()).size(self.config.hint_text_style.size),
        )
        .padding([2, 8])
        .style(move |_theme| cosmic_widget::container::Style {
            text_color: Some(text_color),
            background: Some(Background::Color(background)),
            ..Default::default()
        });

        let hint_layer = cosmic_widget::column()
            .push(cosmic_widget::Space::new(Length::Fill, Length::Fill))
            .push(cosmic_widget::container(hint).center_x(Length::Fill))
            .push(cosmic_widget::Space::new(
                Length::Fill,
                Length::Fixed(
                    (self.config.bottom_height + self.config.hint_text_position).max(0.0),
                ),
            ))
            .width(Length::Fill)
            .height(Length::Fill);

        cosmic::iced::widget::stack![Element::from(drawing), hint_layer]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

impl Drop for ViewfinderOverlay {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(width: f32, top: f32, left: f32) -> MeasuredLayout {
        MeasuredLayout {
            container_width: width,
            top_offset: top,
            left_offset: left,
        }
    }

    #[test]
    fn test_panels_frame_the_border_box() {
        let config = OverlayConfig::default();
        let area = Size::new(400.0, 400.0);
        let viewfinder = viewfinder_bounds(area, &config);
        assert_eq!(viewfinder, Rectangle::new(Point::new(100.0, 50.0), Size::new(200.0, 200.0)));

        let layout = measured(400.0, viewfinder.y, viewfinder.x);
        let panels = compute_mask_geometry(&config, &layout).panels(300.0);
        let frame = border_box(viewfinder, &config);

        assert_eq!(panels.top.height, frame.y);
        assert_eq!(panels.bottom.y, frame.y + frame.height);
        assert_eq!(panels.left.width, frame.x);
        assert_eq!(panels.right.x, frame.x + frame.width);
        assert_eq!(panels.left.y, frame.y);
        assert_eq!(panels.left.height, frame.height);
    }

    #[test]
    fn test_unmeasured_panels_are_degenerate() {
        let config = OverlayConfig::default();
        let panels = compute_mask_geometry(&config, &MeasuredLayout::default()).panels(0.0);
        assert_eq!(panels.top.width, 0.0);
        assert_eq!(panels.top.height, 0.0);
        assert_eq!(panels.bottom.height, 0.0);
        assert!(panels.iter().all(|p| p.width >= 0.0 && p.height >= 0.0));
    }

    #[test]
    fn test_container_excludes_bottom_band() {
        let config = OverlayConfig::default();
        assert_eq!(
            container_size(Size::new(360.0, 640.0), &config),
            Size::new(360.0, 540.0)
        );
        assert_eq!(container_size(Size::new(10.0, 20.0), &config).height, 0.0);
    }

    #[test]
    fn test_corner_brackets_hug_corners() {
        let viewfinder = Rectangle::new(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
        let [tl, tr, bl, br] = corner_brackets(viewfinder, 20.0, 4.0);

        assert_eq!(tl.horizontal.position(), Point::new(10.0, 20.0));
        assert_eq!(tl.vertical.size(), Size::new(4.0, 20.0));
        assert_eq!(tr.horizontal.x + tr.horizontal.width, 110.0);
        assert_eq!(tr.vertical.x, 106.0);
        assert_eq!(bl.horizontal.y, 66.0);
        assert_eq!(bl.vertical.y, 50.0);
        assert_eq!(br.horizontal.x, 90.0);
        assert_eq!(br.vertical.y + br.vertical.height, 70.0);
    }

    #[test]
    fn test_scan_bar_bounds_respect_margins() {
        let config = OverlayConfig {
            border_width: 2.0,
            ..Default::default()
        };
        let frame = Rectangle::new(Point::new(0.0, 0.0), Size::new(198.0, 198.0));
        let bar = scan_bar_bounds(frame, &config, 40.0);
        assert_eq!(bar.x, 8.0);
        assert_eq!(bar.y, 42.0);
        assert_eq!(bar.width, 198.0 - 4.0 - 12.0);
        assert_eq!(bar.height, 1.5);
    }

    #[test]
    fn test_scan_bar_image_uses_image_width() {
        let config = OverlayConfig {
            scan_bar_image: Some("bar.png".into()),
            ..Default::default()
        };
        let frame = Rectangle::new(Point::new(1.0, 1.0), Size::new(198.0, 198.0));
        let bar = scan_bar_bounds(frame, &config, 0.0);
        assert_eq!(bar.x, 1.0);
        assert_eq!(bar.width, 188.0);
    }

    #[test]
    fn test_spinner_head_is_opaque() {
        let dots = spinner_dots(Point::new(0.0, 0.0), 3);
        assert_eq!(dots.len(), overlay::SPINNER_DOTS);
        assert_eq!(dots[3].1, 1.0);
        assert!(dots[2].1 < dots[3].1);
        assert!(dots[4].1 < dots[2].1);
    }

    #[test]
    fn test_layout_events_update_measurements() {
        let mut overlay = ViewfinderOverlay::new(OverlayConfig::default());
        overlay.on_layout(LayoutEvent::Container(Size::new(320.0, 480.0)));
        overlay.on_layout(LayoutEvent::Viewfinder(Rectangle::new(
            Point::new(60.0, 140.0),
            Size::new(200.0, 200.0),
        )));
        assert_eq!(*overlay.measured(), measured(320.0, 140.0, 60.0));
    }

    #[test]
    fn test_unmount_cancels_timer() {
        let mut overlay = ViewfinderOverlay::new(OverlayConfig::default());
        let timer = overlay.timer().clone();
        overlay.unmount();
        assert!(timer.is_cancelled());
        assert!(!overlay.is_animating());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let overlay = ViewfinderOverlay::new(OverlayConfig::default());
        let timer = overlay.timer().clone();
        drop(overlay);
        assert!(timer.is_cancelled());
    }
}
