// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Default look of the viewfinder overlay
pub mod overlay {
    /// Semi-transparent black covering everything outside the viewfinder
    pub const MASK_COLOR: &str = "#0000004D";
    pub const CORNER_COLOR: &str = "#22ff00";
    pub const BORDER_COLOR: &str = "#000000";
    pub const LOADING_COLOR: &str = "#ffffff";
    pub const SCAN_BAR_COLOR: &str = "#22ff00";
    pub const HINT_TEXT_COLOR: &str = "#fff";
    pub const HINT_BACKGROUND_COLOR: &str = "#00000000";

    pub const RECT_HEIGHT: f32 = 200.0;
    pub const RECT_WIDTH: f32 = 200.0;
    pub const BORDER_WIDTH: f32 = 0.0;
    pub const CORNER_BORDER_WIDTH: f32 = 4.0;
    pub const CORNER_BORDER_LENGTH: f32 = 20.0;
    pub const CORNER_OFFSET_SIZE: f32 = 1.0;

    /// Space reserved below the mask container for the footer slot
    pub const BOTTOM_HEIGHT: f32 = 100.0;

    /// Scan bar travel time from the top to the bottom of the viewfinder
    pub const SCAN_BAR_ANIMATE_TIME_MS: u64 = 2500;
    pub const SCAN_BAR_HEIGHT: f32 = 1.5;
    pub const SCAN_BAR_MARGIN: f32 = 6.0;

    pub const HINT_TEXT_SIZE: f32 = 14.0;
    /// Distance between the hint label and the bottom of the mask container
    pub const HINT_TEXT_POSITION: f32 = 130.0;

    /// Number of dots drawn by the loading spinner
    pub const SPINNER_DOTS: usize = 8;
    pub const SPINNER_RADIUS: f32 = 18.0;
    pub const SPINNER_DOT_SIZE: f32 = 6.0;
}

/// Header and footer slot defaults
pub mod slots {
    pub const TOP_HEIGHT: f32 = 100.0;
    pub const BOTTOM_HEIGHT: f32 = 100.0;
    pub const BOTTOM_BACKGROUND: &str = "#0000004D";
}

/// Detection window handed to the camera collaborator
///
/// The window is slightly larger than the visible viewfinder so codes held
/// near its edges are still picked up.
pub mod detection {
    pub const WINDOW_EXTRA_WIDTH: f32 = 30.0;
    pub const WINDOW_EXTRA_HEIGHT: f32 = 140.0;

    /// Frames are downscaled to this maximum dimension before decoding
    pub const MAX_DIMENSION: u32 = 640;

    /// Default interval between sampled frames, in milliseconds
    pub const INTERVAL_MS: u64 = 1000;
}

/// GStreamer pipeline settings
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// Capacity of the channel carrying frames to the UI
    pub const FRAME_CHANNEL_CAPACITY: usize = 8;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Step of the scan bar animation (~60 fps)
    pub const SCAN_BAR_FRAME: Duration = Duration::from_millis(16);

    /// Wait before retrying a camera that failed to start
    pub const CAMERA_RETRY: Duration = Duration::from_secs(5);

    /// Poll timeout while waiting for frames, so cancellation is noticed
    pub const FRAME_POLL: Duration = Duration::from_millis(16);
}

/// feedbackd D-Bus endpoint used for haptic pulses
pub mod haptics {
    pub const BUS_NAME: &str = "org.sigxcpu.Feedback";
    pub const OBJECT_PATH: &str = "/org/sigxcpu/Feedback";
    pub const INTERFACE: &str = "org.sigxcpu.Feedback";
    /// Event from the freedesktop feedback theme spec that maps to a short vibration
    pub const EVENT: &str = "button-pressed";
}

/// Application information utilities
pub mod app_info {
    /// Reverse-DNS application id, also used as the feedbackd app id
    pub const APP_ID: &str = "io.github.freddyfunk.scanner";

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
