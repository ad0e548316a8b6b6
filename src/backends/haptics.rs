// SPDX-License-Identifier: MPL-2.0

//! Haptic feedback through feedbackd
//!
//! feedbackd exposes `org.sigxcpu.Feedback.TriggerFeedback` on the session
//! bus and maps named events to vibration patterns. Pulses are fire and
//! forget: the UI thread only pushes onto a channel and a worker thread owns
//! the D-Bus connection.

use crate::constants::haptics;
use std::collections::HashMap;
use std::sync::mpsc;
use tracing::{debug, info, warn};
use zbus::zvariant::Value;

/// Something that can buzz once per read
pub trait HapticFeedback: Send + Sync {
    /// Trigger one pulse without waiting for acknowledgement
    fn pulse(&self);
}

/// No-op feedback for desktops without feedbackd or when disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHaptics;

impl HapticFeedback for SilentHaptics {
    fn pulse(&self) {
        debug!("Haptic pulse (silent)");
    }
}

/// feedbackd client running on its own thread
pub struct Feedbackd {
    sender: mpsc::Sender<()>,
}

impl Feedbackd {
    /// Spawn the worker; connection errors are logged there, never surfaced
    pub fn spawn(app_id: &str) -> Self {
        let (sender, receiver) = mpsc::channel::<()>();
        let app_id = app_id.to_string();

        let spawned = std::thread::Builder::new()
            .name("haptics".to_string())
            .spawn(move || run_worker(&app_id, receiver));
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn haptics thread");
        }

        Self { sender }
    }
}

impl HapticFeedback for Feedbackd {
    fn pulse(&self) {
        if self.sender.send(()).is_err() {
            debug!("Haptics worker gone, pulse dropped");
        }
    }
}

fn run_worker(app_id: &str, receiver: mpsc::Receiver<()>) {
    let proxy = match feedback_proxy() {
        Ok(proxy) => proxy,
        Err(e) => {
            warn!(error = %e, "feedbackd unavailable, haptic pulses disabled");
            // Keep draining so senders never block or error loudly
            for () in receiver {}
            return;
        }
    };

    info!("Haptics worker connected to feedbackd");

    for () in receiver {
        if let Err(e) = trigger(&proxy, app_id) {
            debug!(error = %e, "feedbackd TriggerFeedback failed");
        }
    }

    debug!("Haptics worker stopped");
}

fn feedback_proxy() -> zbus::Result<zbus::blocking::Proxy<'static>> {
    let connection = zbus::blocking::Connection::session()?;
    zbus::blocking::Proxy::new(
        &connection,
        haptics::BUS_NAME,
        haptics::OBJECT_PATH,
        haptics::INTERFACE,
    )
}

fn trigger(proxy: &zbus::blocking::Proxy<'_>, app_id: &str) -> zbus::Result<()> {
    let hints: HashMap<&str, Value<'_>> = HashMap::new();
    // -1 lets feedbackd use the event's natural duration
    let timeout: i32 = -1;

    let _event_id: u32 = proxy.call("TriggerFeedback", &(app_id, haptics::EVENT, hints, timeout))?;

    Ok(())
}

/// Pick the feedback implementation for the current settings
pub fn connect(app_id: &str, enabled: bool) -> Box<dyn HapticFeedback> {
    if enabled {
        Box::new(Feedbackd::spawn(app_id))
    } else {
        Box::new(SilentHaptics)
    }
}
