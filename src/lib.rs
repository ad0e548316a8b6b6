// SPDX-License-Identifier: GPL-3.0-only

//! Scanner - a QR code scanning screen for the COSMIC desktop environment
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application shell, scanner screen and viewfinder overlay
//! - [`backends`]: Camera, torch and haptics access
//! - [`config`]: User configuration handling
//! - [`constants`]: Defaults and timing
//! - [`errors`]: Error types
//! - [`i18n`]: Fluent localizations
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // scanner
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;

// Re-export commonly used types
pub use app::frame_processor::{FrameRegion, ScanResult};
pub use app::scanner::{DetectionWindow, ScannerOptions, ScannerScreen};
pub use app::viewfinder::{MaskGeometry, MeasuredLayout, ViewfinderOverlay};
pub use app::{AppModel, Message};
pub use config::{Config, OverlayConfig};
