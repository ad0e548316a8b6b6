// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::frame_processor::ScanResult;
use crate::app::scanner::ScannerScreen;
use crate::app::viewfinder::LayoutEvent;
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use crate::config::Config;
use cosmic::cosmic_config;
use cosmic::iced::Size;
use cosmic::widget::about::About;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Number of reads kept for the footer
pub const READ_HISTORY: usize = 20;

/// Context drawer pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextPage {
    #[default]
    About,
}

/// The application model stores app-specific state used to describe its
/// interface and drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,

    /// Scanner screen: overlay, haptics, torch and the read handler
    pub scanner: ScannerScreen<Message>,

    // ===== Camera =====
    pub available_cameras: Vec<CameraDevice>,
    pub current_camera_index: usize,
    /// Set once the asynchronous enumeration finished
    pub cameras_initialized: bool,
    /// Stops the camera subscription loop before a camera switch
    pub camera_cancel_flag: Arc<AtomicBool>,
    /// Latest frame, kept for detection
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Latest frame converted for display
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// Size of the preview area as measured by the overlay
    pub preview_area: Size,

    // ===== Detection =====
    pub detection_in_flight: bool,
    pub last_detection_time: Option<Instant>,
    /// Most recent reads, newest first
    pub reads: VecDeque<ScanResult>,
}

impl AppModel {
    /// Currently selected camera, if any were found
    pub fn current_camera(&self) -> Option<&CameraDevice> {
        self.available_cameras.get(self.current_camera_index)
    }

    /// Whether enough time passed since the last detection started
    pub fn detection_due(&self, now: Instant) -> bool {
        !self.detection_in_flight
            && self.scanner.detection_due(self.last_detection_time, now)
    }

    /// Remember a read, dropping the oldest beyond [`READ_HISTORY`]
    pub fn record_read(&mut self, result: ScanResult) {
        self.reads.push_front(result);
        self.reads.truncate(READ_HISTORY);
    }
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page
    ToggleContextPage(ContextPage),
    /// Configuration changed on disk
    UpdateConfig(Config),

    // ===== Camera =====
    /// Cameras enumerated asynchronously during startup
    CamerasInitialized(Vec<CameraDevice>, usize),
    /// Select specific camera by index
    SelectCamera(usize),
    /// New camera frame received from pipeline
    CameraFrame(Arc<CameraFrame>),
    ToggleTorch,

    // ===== Scanning =====
    /// Detector finished with a batch of codes (possibly empty)
    DetectionFinished(Vec<ScanResult>),
    /// One detected code, before the read handler
    CodeDetected(ScanResult),
    /// Produced by the read handler
    CodeRead(ScanResult),
    /// Overlay measured a new container or viewfinder
    OverlayLayout(LayoutEvent),
    ScanBarTick(Instant),
    /// Copy text to the clipboard
    CopyText(String),

    /// No operation
    Noop,
}
