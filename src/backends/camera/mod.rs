// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The scanner never touches pixels beyond handing them to the detector, so
//! the backend surface is small: list devices and start a preview stream.
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │ FrameSender
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│
//! └──────────┬──────────┘
//!            ▼
//!      ┌───────────┐
//!      │ GStreamer │  pipewiresrc / v4l2src / autovideosrc
//!      └───────────┘
//! ```

pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use pipeline::CameraPipeline;
pub use types::*;

/// Camera backend trait
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Start streaming RGBA frames from `device` into `sender`
    ///
    /// Streaming stops when the returned pipeline is dropped.
    fn start_preview(
        &self,
        device: &CameraDevice,
        sender: FrameSender,
    ) -> BackendResult<CameraPipeline>;
}

/// GStreamer-backed camera access
#[derive(Debug, Default, Clone, Copy)]
pub struct GStreamerBackend;

impl CameraBackend for GStreamerBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        enumeration::enumerate_cameras().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Camera enumeration failed");
            Vec::new()
        })
    }

    fn start_preview(
        &self,
        device: &CameraDevice,
        sender: FrameSender,
    ) -> BackendResult<CameraPipeline> {
        CameraPipeline::new(device, sender)
    }
}

/// Get the backend instance
pub fn get_backend() -> Box<dyn CameraBackend> {
    Box::new(GStreamerBackend)
}
