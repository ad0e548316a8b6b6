// SPDX-License-Identifier: GPL-3.0-only

//! Main application module for the scanner
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message)
//! - `scanner`: Scanner screen, the composition root of the scanning view
//! - `viewfinder`: Viewfinder overlay geometry, animation and widget
//! - `frame_processor`: QR detection on camera frames
//! - `view`: Main view rendering
//! - `update`: Message handling

pub mod frame_processor;
pub mod scanner;
mod state;
mod update;
mod view;
pub mod viewfinder;

use crate::backends::{haptics, torch::TorchDevice};
use crate::config::Config;
use crate::fl;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::{Size, Subscription};
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
use self::scanner::{ScannerOptions, ScannerScreen};
pub use state::{AppModel, ContextPage, Message};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = crate::constants::app_info::APP_ID;

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .version(env!("GIT_VERSION"))
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // Initialize GStreamer early (required before any GStreamer calls)
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        let torch_devices = TorchDevice::discover();
        info!(count = torch_devices.len(), "Torch LEDs available");

        let scanner = ScannerScreen::new(
            ScannerOptions::from(&config),
            haptics::connect(Self::APP_ID, config.haptics_enabled),
        )
        .with_torch_devices(torch_devices)
        .on_read(Message::CodeRead);

        // Honour a torch left on in the previous session
        let torch_on = config.torch_mode;

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            scanner,
            available_cameras: Vec::new(),
            current_camera_index: 0,
            cameras_initialized: false,
            camera_cancel_flag: Arc::new(AtomicBool::new(false)),
            current_frame: None,
            preview_handle: None,
            preview_area: Size::ZERO,
            detection_in_flight: false,
            last_detection_time: None,
            reads: VecDeque::new(),
        };

        if torch_on {
            app.scanner.set_torch(true);
        }

        let last_camera_path = app.config.last_camera_path.clone();
        let init_task = Task::perform(
            async move {
                let cameras = tokio::task::spawn_blocking(|| {
                    crate::backends::camera::get_backend().enumerate_cameras()
                })
                .await
                .unwrap_or_else(|e| {
                    error!(error = %e, "Camera enumeration task failed");
                    Vec::new()
                });
                info!(count = cameras.len(), "Found camera(s)");

                let camera_index = last_camera_path
                    .as_ref()
                    .and_then(|last| cameras.iter().position(|cam| &cam.path == last))
                    .unwrap_or(0);

                (cameras, camera_index)
            },
            |(cameras, index)| cosmic::Action::App(Message::CamerasInitialized(cameras, index)),
        );

        (app, init_task)
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        let torch_icon = if self.scanner.options().torch_mode {
            "display-brightness-symbolic"
        } else {
            "display-brightness-off-symbolic"
        };

        vec![
            widget::tooltip(
                widget::button::icon(widget::icon::from_name(torch_icon))
                    .on_press(Message::ToggleTorch),
                widget::text(fl!("torch")),
                widget::tooltip::Position::Bottom,
            )
            .into(),
            widget::button::icon(widget::icon::from_name("help-about-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::About))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::StreamExt;

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        let current_camera = self.current_camera().cloned();
        let camera_index = self.current_camera_index;
        let cancel_flag = Arc::clone(&self.camera_cancel_flag);

        let camera_sub = Subscription::run_with_id(
            ("camera", camera_index, self.cameras_initialized),
            cosmic::iced::stream::channel(
                crate::constants::pipeline::FRAME_CHANNEL_CAPACITY,
                move |mut output| async move {
                    use crate::constants::{pipeline, timing};

                    // Cameras not enumerated yet; restarts once they are
                    let Some(device) = current_camera else {
                        info!("No camera available yet");
                        return;
                    };

                    info!(camera_index, device = %device, "Camera subscription started");
                    let mut frame_count = 0u64;

                    loop {
                        if cancel_flag.load(Ordering::Acquire) {
                            info!("Cancel flag set - camera subscription exiting");
                            break;
                        }

                        let (sender, mut receiver) =
                            cosmic::iced::futures::channel::mpsc::channel(
                                pipeline::FRAME_CHANNEL_CAPACITY,
                            );

                        let backend = crate::backends::camera::get_backend();
                        let pipeline = match backend.start_preview(&device, sender) {
                            Ok(pipeline) => pipeline,
                            Err(e) => {
                                error!(error = %e, "Failed to start camera pipeline");
                                tokio::time::sleep(timing::CAMERA_RETRY).await;
                                continue;
                            }
                        };

                        loop {
                            if cancel_flag.load(Ordering::Acquire) || output.is_closed() {
                                break;
                            }

                            // Timeout so cancellation is noticed without frames
                            match tokio::time::timeout(timing::FRAME_POLL, receiver.next()).await {
                                Ok(Some(frame)) => {
                                    frame_count += 1;
                                    if frame_count % timing::FRAME_LOG_INTERVAL == 0 {
                                        info!(
                                            frame = frame_count,
                                            width = frame.width,
                                            height = frame.height,
                                            "Received frame from pipeline"
                                        );
                                    }

                                    // Dropping preview frames is fine, the next one replaces it
                                    if let Err(e) =
                                        output.try_send(Message::CameraFrame(Arc::new(frame)))
                                    {
                                        if e.is_disconnected() {
                                            break;
                                        }
                                        tracing::debug!(
                                            frame = frame_count,
                                            "Frame dropped (UI busy)"
                                        );
                                    }
                                }
                                Ok(None) => {
                                    info!("Camera frame stream ended");
                                    break;
                                }
                                Err(_) => continue,
                            }
                        }

                        info!("Cleaning up camera pipeline");
                        drop(pipeline);

                        if cancel_flag.load(Ordering::Acquire) || output.is_closed() {
                            break;
                        }
                        tokio::time::sleep(timing::CAMERA_RETRY).await;
                    }
                },
            ),
        );

        let overlay = self.scanner.overlay();
        let scan_bar_sub = if overlay.is_animating() {
            overlay.timer().subscription(Message::ScanBarTick)
        } else {
            Subscription::none()
        };

        Subscription::batch([config_sub, camera_sub, scan_bar_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
