// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function is a dispatcher; each message kind has a
//! focused handler method below it.

use crate::app::frame_processor::ScanResult;
use crate::app::frame_processor::tasks::QrDetector;
use crate::app::scanner::ScannerOptions;
use crate::app::state::{AppModel, ContextPage, Message};
use crate::app::viewfinder::LayoutEvent;
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use crate::backends::haptics;
use crate::config::Config;
use crate::constants::app_info::APP_ID;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),
            Message::UpdateConfig(config) => self.handle_update_config(config),

            // ===== Camera =====
            Message::CamerasInitialized(cameras, index) => {
                self.handle_cameras_initialized(cameras, index)
            }
            Message::SelectCamera(index) => self.handle_select_camera(index),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::ToggleTorch => self.handle_toggle_torch(),

            // ===== Scanning =====
            Message::DetectionFinished(results) => self.handle_detection_finished(results),
            Message::CodeDetected(result) => self.handle_code_detected(result),
            Message::CodeRead(result) => self.handle_code_read(result),
            Message::OverlayLayout(event) => self.handle_overlay_layout(event),
            Message::ScanBarTick(now) => {
                self.scanner.overlay_mut().scan_bar_tick(now);
                Task::none()
            }
            Message::CopyText(text) => self.handle_copy_text(text),

            Message::Noop => Task::none(),
        }
    }

    // =========================================================================
    // UI Navigation
    // =========================================================================

    fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");

        if config.haptics_enabled != self.config.haptics_enabled {
            self.scanner
                .set_haptics(haptics::connect(APP_ID, config.haptics_enabled));
        }
        self.scanner.set_options(ScannerOptions::from(&config));
        self.config = config;
        Task::none()
    }

    fn save_config(&self, what: &'static str) {
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, setting = what, "Failed to save setting");
        }
    }

    // =========================================================================
    // Camera
    // =========================================================================

    fn handle_cameras_initialized(
        &mut self,
        cameras: Vec<CameraDevice>,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        if cameras.is_empty() {
            warn!("No cameras enumerated, falling back to automatic source");
            self.available_cameras = vec![CameraDevice::automatic()];
            self.current_camera_index = 0;
        } else {
            self.current_camera_index = index.min(cameras.len() - 1);
            self.available_cameras = cameras;
        }
        self.cameras_initialized = true;

        if let Some(camera) = self.current_camera() {
            info!(camera = %camera, "Using camera");
        }
        Task::none()
    }

    fn handle_select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if index == self.current_camera_index || index >= self.available_cameras.len() {
            return Task::none();
        }

        // Stop the running loop; the new subscription gets a fresh flag
        self.camera_cancel_flag.store(true, Ordering::Release);
        self.camera_cancel_flag = Arc::new(AtomicBool::new(false));

        self.current_camera_index = index;
        self.current_frame = None;
        self.preview_handle = None;

        let path = self.current_camera().map(|camera| camera.path.clone());
        info!(index, path = ?path, "Switching camera");
        self.config.last_camera_path = path;
        self.save_config("last_camera_path");

        Task::none()
    }

    fn handle_camera_frame(&mut self, frame: Arc<CameraFrame>) -> Task<cosmic::Action<Message>> {
        self.preview_handle = Some(cosmic::widget::image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.packed_rgba(),
        ));
        self.current_frame = Some(Arc::clone(&frame));

        let now = Instant::now();
        if !self.detection_due(now) {
            return Task::none();
        }

        self.detection_in_flight = true;
        self.last_detection_time = Some(now);

        let region = self
            .scanner
            .frame_region(self.preview_area, frame.width, frame.height);
        let detector = QrDetector::new();

        Task::perform(
            async move { detector.detect(frame, region).await },
            |results| cosmic::Action::App(Message::DetectionFinished(results)),
        )
    }

    fn handle_toggle_torch(&mut self) -> Task<cosmic::Action<Message>> {
        let enabled = !self.scanner.options().torch_mode;
        self.scanner.set_torch(enabled);
        self.config.torch_mode = enabled;
        self.save_config("torch_mode");
        Task::none()
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Each code in the batch goes through the read path on its own, in
    /// the order the detector reported them
    fn handle_detection_finished(
        &mut self,
        results: Vec<ScanResult>,
    ) -> Task<cosmic::Action<Message>> {
        self.detection_in_flight = false;

        let tasks: Vec<_> = results
            .into_iter()
            .map(|result| self.update(Message::CodeDetected(result)))
            .collect();
        Task::batch(tasks)
    }

    fn handle_code_detected(&mut self, result: ScanResult) -> Task<cosmic::Action<Message>> {
        match self.scanner.on_detection(result) {
            Some(message) => self.update(message),
            None => Task::none(),
        }
    }

    fn handle_code_read(&mut self, result: ScanResult) -> Task<cosmic::Action<Message>> {
        info!(data = %result.data, "Code read");
        self.record_read(result);
        Task::none()
    }

    fn handle_overlay_layout(&mut self, event: LayoutEvent) -> Task<cosmic::Action<Message>> {
        debug!(?event, "Overlay layout");
        if let LayoutEvent::Area(size) = event {
            self.preview_area = size;
        }
        self.scanner.overlay_mut().on_layout(event);
        Task::none()
    }

    fn handle_copy_text(&self, text: String) -> Task<cosmic::Action<Message>> {
        info!(text_length = text.len(), "Copying read to clipboard");
        cosmic::iced::clipboard::write(text).map(|_: ()| cosmic::Action::App(Message::Noop))
    }
}
