// SPDX-License-Identifier: GPL-3.0-only

//! Torch LED control via Linux sysfs
//!
//! Discovers LEDs exposed at `/sys/class/leds/*:flash` or `*:torch` and
//! drives them through the `brightness` file, which is group-writable by
//! `feedbackd` on mobile distributions.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LEDS_DIR: &str = "/sys/class/leds";

/// Torch state handed to the camera collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorchMode {
    #[default]
    Off,
    On,
}

impl From<bool> for TorchMode {
    fn from(enabled: bool) -> Self {
        if enabled { TorchMode::On } else { TorchMode::Off }
    }
}

/// A torch-capable LED discovered via sysfs
#[derive(Debug, Clone)]
pub struct TorchDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Value written for full brightness
    max_brightness: u32,
    name: String,
}

/// Whether a LED class entry looks like a camera flash or torch
fn is_torch_led(name: &str) -> bool {
    name.ends_with(":flash") || name.ends_with(":torch")
}

impl TorchDevice {
    /// Scan `/sys/class/leds/` and return the devices we can write to
    pub fn discover() -> Vec<TorchDevice> {
        Self::discover_in(Path::new(LEDS_DIR))
    }

    /// Scan an arbitrary LED class directory
    pub fn discover_in(leds_dir: &Path) -> Vec<TorchDevice> {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(path = %leds_dir.display(), "Cannot read LED directory, torch unavailable");
            return Vec::new();
        };

        let mut devices = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };
            if !is_torch_led(name_str) {
                continue;
            }

            let led_path = entry.path();
            let max_brightness_path = led_path.join("max_brightness");

            let max_brightness = match std::fs::read_to_string(&max_brightness_path)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
            {
                Some(v) if v > 0 => v,
                _ => {
                    warn!(path = %max_brightness_path.display(), "Invalid max_brightness");
                    continue;
                }
            };

            if let Err(e) = std::fs::OpenOptions::new()
                .write(true)
                .open(led_path.join("brightness"))
            {
                warn!(
                    led = name_str,
                    error = %e,
                    "Torch LED not writable, user may need to be in the 'feedbackd' group"
                );
                continue;
            }

            info!(name = name_str, max_brightness, "Discovered torch LED");

            devices.push(TorchDevice {
                path: led_path,
                max_brightness,
                name: name_str.to_string(),
            });
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    pub fn apply(&self, mode: TorchMode) -> io::Result<()> {
        match mode {
            TorchMode::Off => self.set_brightness(0),
            TorchMode::On => self.set_brightness(self.max_brightness),
        }
    }
}

/// Apply a torch mode to every discovered LED
pub fn apply_all(devices: &[TorchDevice], mode: TorchMode) {
    for dev in devices {
        if let Err(e) = dev.apply(mode) {
            warn!(device = %dev.name, ?mode, error = %e, "Failed to set torch LED");
        }
    }
}
