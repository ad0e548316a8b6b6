// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for the hardware around the scanner screen
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │  Camera  │  │  Torch   │  │ Haptics  │  │
//! │  │(GStreamer│  │ (sysfs)  │  │(feedbackd│  │
//! │  └──────────┘  └──────────┘  └──────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`camera`]: device enumeration and RGBA preview frames
//! - [`torch`]: flash LED control for torch mode
//! - [`haptics`]: vibration pulse on every read

pub mod camera;
pub mod haptics;
pub mod torch;
