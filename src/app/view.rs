// SPDX-License-Identifier: GPL-3.0-only

//! Main view rendering

use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::SourceKind;
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Background, Color, ContentFit, Length};
use cosmic::widget;

/// Characters of a read shown in the footer before eliding
const READ_PREVIEW_CHARS: usize = 64;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let preview = self.preview_view();
        let top = self.camera_row();
        let bottom = self.last_read_view();

        self.scanner
            .view(preview, top, Some(bottom), Message::OverlayLayout)
    }

    /// Camera preview, or a status line until the first frame arrives
    fn preview_view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.preview_handle {
            Some(handle) => widget::image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Cover)
                .into(),
            None => {
                // Only the automatic fallback is left when enumeration found nothing
                let nothing_found = self
                    .current_camera()
                    .is_some_and(|camera| camera.source == SourceKind::Auto);
                let status = if self.cameras_initialized && nothing_found {
                    fl!("no-camera")
                } else {
                    fl!("initializing-camera")
                };
                widget::container(widget::text(status))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .style(|_theme| widget::container::Style {
                        text_color: Some(Color::WHITE),
                        ..Default::default()
                    })
                    .into()
            }
        };

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into()
    }

    /// Camera switcher for the header slot, only with several cameras
    fn camera_row(&self) -> Option<Element<'_, Message>> {
        if self.available_cameras.len() < 2 {
            return None;
        }

        let spacing = cosmic::theme::spacing();
        let mut row = widget::row().spacing(spacing.space_xs).padding(spacing.space_s);
        for (index, camera) in self.available_cameras.iter().enumerate() {
            let button = if index == self.current_camera_index {
                widget::button::suggested(camera.name.clone())
            } else {
                widget::button::standard(camera.name.clone()).on_press(Message::SelectCamera(index))
            };
            row = row.push(button);
        }

        Some(widget::container(row).center_x(Length::Fill).into())
    }

    /// Footer: the newest read with copy and open actions
    fn last_read_view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let body: Element<'_, Message> = match self.reads.front() {
            Some(read) => {
                let mut text: String = read.data.chars().take(READ_PREVIEW_CHARS).collect();
                if read.data.chars().count() > READ_PREVIEW_CHARS {
                    text.push('…');
                }

                let mut actions = widget::row().spacing(spacing.space_xs).push(
                    widget::button::standard(fl!("copy"))
                        .on_press(Message::CopyText(read.data.clone())),
                );
                if let Some(url) = link_target(&read.data) {
                    actions = actions.push(
                        widget::button::suggested(fl!("open-link"))
                            .on_press(Message::LaunchUrl(url.to_string())),
                    );
                }

                widget::column()
                    .spacing(spacing.space_xxs)
                    .push(widget::text::caption(format!(
                        "{} · {}",
                        fl!("last-read"),
                        read.detected_at.format("%H:%M:%S")
                    )))
                    .push(widget::text::body(text))
                    .push(actions)
                    .into()
            }
            None => widget::text::body(fl!("no-reads")).into(),
        };

        widget::container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(spacing.space_s)
            .center_y(Length::Fill)
            .style(|_theme| widget::container::Style {
                text_color: Some(Color::WHITE),
                ..Default::default()
            })
            .into()
    }
}

/// The URL to launch for a read, if it looks like one `open` can handle
fn link_target(data: &str) -> Option<&str> {
    let url = data.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::link_target;

    #[test]
    fn test_link_target() {
        assert_eq!(link_target("https://example.com/a"), Some("https://example.com/a"));
        assert_eq!(link_target("HTTP://EXAMPLE.COM"), Some("HTTP://EXAMPLE.COM"));
        assert_eq!(link_target("ABC123"), None);
        assert_eq!(link_target("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_link_target_is_trimmed() {
        assert_eq!(link_target("  https://example.com/a\n"), Some("https://example.com/a"));
    }
}
