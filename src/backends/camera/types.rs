// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Which GStreamer source element feeds a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// `pipewiresrc target-object=<serial>`
    PipeWire,
    /// `v4l2src device=<path>`
    V4l2,
    /// `autovideosrc`, used when nothing was enumerated
    Auto,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// PipeWire object serial or V4L2 device node, empty for [`SourceKind::Auto`]
    pub path: String,
    pub source: SourceKind,
}

impl CameraDevice {
    /// Let GStreamer pick whatever camera it finds first
    pub fn automatic() -> Self {
        Self {
            name: "Default Camera".to_string(),
            path: String::new(),
            source: SourceKind::Auto,
        }
    }

    /// GStreamer launch fragment for the source element
    pub fn source_description(&self) -> String {
        match self.source {
            SourceKind::PipeWire => format!("pipewiresrc target-object={}", self.path),
            SourceKind::V4l2 => format!("v4l2src device={}", self.path),
            SourceKind::Auto => "autovideosrc".to_string(),
        }
    }
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.path)
        }
    }
}

/// A single RGBA camera frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA bytes, rows may be padded to `stride`
    pub data: Arc<[u8]>,
    /// Bytes per row
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Frame from tightly packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// Copy the pixels without stride padding
    pub fn packed_rgba(&self) -> Vec<u8> {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;

        if stride == width * 4 {
            return self.data[..(width * height * 4).min(self.data.len())].to_vec();
        }

        let mut result = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + width * 4;
            if row_end <= self.data.len() {
                result.extend_from_slice(&self.data[row_start..row_end]);
            }
        }
        result
    }
}

/// Sender for frames from camera backends
pub type FrameSender = cosmic::iced::futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Camera backend errors
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to initialize the backend
    InitializationFailed(String),
    /// Generic error
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<gstreamer::glib::Error> for BackendError {
    fn from(err: gstreamer::glib::Error) -> Self {
        BackendError::InitializationFailed(err.to_string())
    }
}

impl From<gstreamer::glib::BoolError> for BackendError {
    fn from(err: gstreamer::glib::BoolError) -> Self {
        BackendError::Other(err.to_string())
    }
}
