// SPDX-License-Identifier: GPL-3.0-only

//! Custom viewfinder widget
//!
//! Draws the mask panels, frame border, corner brackets, scan bar and
//! loading spinner straight through the renderer, positioned from the
//! actual layout bounds. A scan bar image is a real image widget laid out as
//! a child. Measured bounds are compared against the last published ones on
//! every event and changes are published as [`LayoutEvent`]s.

use super::{
    LayoutEvent, MaskGeometry, Palette, border_box, container_size, corner_brackets,
    scan_bar_bounds, spinner_dots, viewfinder_bounds,
};
use crate::config::OverlayConfig;
use cosmic::iced::advanced::widget::{Tree, tree};
use cosmic::iced::advanced::{Clipboard, Layout, Shell, Widget, layout, mouse, renderer};
use cosmic::iced::event::Status;
use cosmic::iced::{Border, Color, Element, Event, Length, Point, Rectangle, Size, Vector};
use cosmic::{Renderer, Theme};

/// Last bounds published to the application
#[derive(Debug, Default)]
struct Published {
    area: Option<Size>,
    container: Option<Size>,
    viewfinder: Option<Rectangle>,
}

/// Layout events for everything that differs from `published`, which is
/// updated to the new values
fn layout_changes(
    published: &mut Published,
    area: Size,
    config: &OverlayConfig,
) -> Vec<LayoutEvent> {
    let mut events = Vec::new();

    if published.area != Some(area) {
        published.area = Some(area);
        events.push(LayoutEvent::Area(area));
    }

    let container = container_size(area, config);
    if published.container != Some(container) {
        published.container = Some(container);
        events.push(LayoutEvent::Container(container));
    }

    let viewfinder = viewfinder_bounds(area, config);
    if published.viewfinder != Some(viewfinder) {
        published.viewfinder = Some(viewfinder);
        events.push(LayoutEvent::Viewfinder(viewfinder));
    }

    events
}

pub struct ViewfinderWidget<'a, Message> {
    config: &'a OverlayConfig,
    palette: Palette,
    geometry: MaskGeometry,
    scan_bar_offset: f32,
    spinner_step: usize,
    /// Zero or one child: the scan bar image
    scan_bar_image: Vec<Element<'a, Message, Theme, Renderer>>,
    on_layout: fn(LayoutEvent) -> Message,
}

impl<'a, Message> ViewfinderWidget<'a, Message> {
    pub fn new(
        config: &'a OverlayConfig,
        palette: Palette,
        geometry: MaskGeometry,
        scan_bar_offset: f32,
        spinner_step: usize,
        scan_bar_image: Option<Element<'a, Message, Theme, Renderer>>,
        on_layout: fn(LayoutEvent) -> Message,
    ) -> Self {
        Self {
            config,
            palette,
            geometry,
            scan_bar_offset,
            spinner_step,
            scan_bar_image: scan_bar_image.into_iter().collect(),
            on_layout,
        }
    }
}

fn fill(renderer: &mut Renderer, bounds: Rectangle, color: Color) {
    use cosmic::iced::advanced::Renderer as _;

    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return;
    }
    renderer.fill_quad(
        renderer::Quad {
            bounds,
            border: Border::default(),
            shadow: Default::default(),
        },
        color,
    );
}

impl<'a, Message> Widget<Message, Theme, Renderer> for ViewfinderWidget<'a, Message> {
    fn size(&self) -> Size<Length> {
        Size::new(Length::Fill, Length::Fill)
    }

    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<Published>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(Published::default())
    }

    fn children(&self) -> Vec<Tree> {
        self.scan_bar_image.iter().map(Tree::new).collect()
    }

    fn diff(&mut self, tree: &mut Tree) {
        tree.diff_children(&mut self.scan_bar_image);
    }

    fn layout(
        &self,
        tree: &mut Tree,
        renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        let size = limits.max();
        let frame = border_box(viewfinder_bounds(size, self.config), self.config);
        let bar = scan_bar_bounds(frame, self.config, self.scan_bar_offset);

        let image_nodes: Vec<layout::Node> = self
            .scan_bar_image
            .iter()
            .zip(tree.children.iter_mut())
            .map(|(image, child_tree)| {
                let image_limits = layout::Limits::new(
                    Size::ZERO,
                    Size::new(bar.width, self.config.rect_height.max(0.0)),
                );
                image
                    .as_widget()
                    .layout(child_tree, renderer, &image_limits)
                    .move_to(bar.position())
            })
            .collect();

        layout::Node::with_children(size, image_nodes)
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &renderer::Style,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        use cosmic::iced::advanced::Renderer as _;

        let bounds = layout.bounds();
        let origin = Vector::new(bounds.x, bounds.y);
        let container = container_size(bounds.size(), self.config);

        for panel in self.geometry.panels(container.height).iter() {
            fill(renderer, panel + origin, self.palette.mask);
        }

        let viewfinder = viewfinder_bounds(bounds.size(), self.config) + origin;
        let frame = border_box(viewfinder, self.config);

        if self.config.border_width > 0.0 {
            renderer.fill_quad(
                renderer::Quad {
                    bounds: frame,
                    border: Border {
                        color: self.palette.border,
                        width: self.config.border_width,
                        radius: 0.0.into(),
                    },
                    shadow: Default::default(),
                },
                Color::TRANSPARENT,
            );
        }

        if self.config.is_show_scan_bar {
            if self.scan_bar_image.is_empty() {
                let bar = scan_bar_bounds(frame, self.config, self.scan_bar_offset);
                fill(renderer, bar, self.palette.scan_bar);
            }

            for ((image, child_tree), child_layout) in self
                .scan_bar_image
                .iter()
                .zip(tree.children.iter())
                .zip(layout.children())
            {
                image.as_widget().draw(
                    child_tree,
                    renderer,
                    theme,
                    style,
                    child_layout,
                    cursor,
                    viewport,
                );
            }
        }

        for bracket in corner_brackets(
            viewfinder,
            self.config.corner_border_length,
            self.config.corner_border_width,
        ) {
            fill(renderer, bracket.horizontal, self.palette.corner);
            fill(renderer, bracket.vertical, self.palette.corner);
        }

        if self.config.is_loading {
            let center = Point::new(
                viewfinder.x + viewfinder.width / 2.0,
                viewfinder.y + viewfinder.height / 2.0,
            );
            for (dot, alpha) in spinner_dots(center, self.spinner_step) {
                let color = Color {
                    a: self.palette.loading.a * alpha,
                    ..self.palette.loading
                };
                renderer.fill_quad(
                    renderer::Quad {
                        bounds: dot,
                        border: Border {
                            radius: (dot.width / 2.0).into(),
                            ..Default::default()
                        },
                        shadow: Default::default(),
                    },
                    color,
                );
            }
        }
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        _event: Event,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> Status {
        let published = tree.state.downcast_mut::<Published>();
        for event in layout_changes(published, layout.bounds().size(), self.config) {
            shell.publish((self.on_layout)(event));
        }

        Status::Ignored
    }
}

impl<'a, Message: 'a> From<ViewfinderWidget<'a, Message>>
    for Element<'a, Message, Theme, Renderer>
{
    fn from(widget: ViewfinderWidget<'a, Message>) -> Self {
        Element::new(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_layout_publishes_everything() {
        let config = OverlayConfig::default();
        let mut published = Published::default();

        let events = layout_changes(&mut published, Size::new(400.0, 500.0), &config);

        assert_eq!(
            events,
            vec![
                LayoutEvent::Area(Size::new(400.0, 500.0)),
                LayoutEvent::Container(Size::new(400.0, 400.0)),
                LayoutEvent::Viewfinder(Rectangle::new(
                    Point::new(100.0, 100.0),
                    Size::new(200.0, 200.0),
                )),
            ]
        );
    }

    #[test]
    fn test_same_size_publishes_nothing() {
        let config = OverlayConfig::default();
        let mut published = Published::default();
        let area = Size::new(400.0, 500.0);

        layout_changes(&mut published, area, &config);

        assert!(layout_changes(&mut published, area, &config).is_empty());
    }

    #[test]
    fn test_resize_republishes() {
        let config = OverlayConfig::default();
        let mut published = Published::default();
        layout_changes(&mut published, Size::new(400.0, 500.0), &config);

        let events = layout_changes(&mut published, Size::new(600.0, 500.0), &config);

        assert_eq!(
            events,
            vec![
                LayoutEvent::Area(Size::new(600.0, 500.0)),
                LayoutEvent::Container(Size::new(600.0, 400.0)),
                LayoutEvent::Viewfinder(Rectangle::new(
                    Point::new(200.0, 100.0),
                    Size::new(200.0, 200.0),
                )),
            ]
        );
    }

    #[test]
    fn test_area_shorter_than_bottom_band() {
        let config = OverlayConfig::default();
        let mut published = Published::default();

        let events = layout_changes(&mut published, Size::new(300.0, 60.0), &config);

        assert_eq!(events[0], LayoutEvent::Area(Size::new(300.0, 60.0)));
        assert_eq!(events[1], LayoutEvent::Container(Size::new(300.0, 0.0)));
    }

    #[test]
    fn test_config_change_republishes_without_resize() {
        let mut config = OverlayConfig::default();
        let mut published = Published::default();
        let area = Size::new(400.0, 500.0);
        layout_changes(&mut published, area, &config);

        config.bottom_height = 200.0;
        let events = layout_changes(&mut published, area, &config);

        assert_eq!(
            events,
            vec![
                LayoutEvent::Container(Size::new(400.0, 300.0)),
                LayoutEvent::Viewfinder(Rectangle::new(
                    Point::new(100.0, 50.0),
                    Size::new(200.0, 200.0),
                )),
            ]
        );
    }
}
