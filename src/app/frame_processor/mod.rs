// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for async frame analysis
//!
//! Camera frames are sampled at an interval and handed to the detection
//! task. Each decoded code becomes one [`ScanResult`].

pub mod tasks;
pub mod types;

pub use tasks::qr_detector;
pub use types::{FrameRegion, ScanResult};
