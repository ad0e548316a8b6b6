// SPDX-License-Identifier: GPL-3.0-only

//! Camera discovery through the GStreamer device monitor

use super::types::{BackendError, BackendResult, CameraDevice, SourceKind};
use gstreamer::prelude::*;
use tracing::{debug, info};

/// List video sources known to GStreamer
///
/// PipeWire nodes are preferred; V4L2 nodes that PipeWire already exposes
/// show up twice in the monitor and are skipped.
pub fn enumerate_cameras() -> BackendResult<Vec<CameraDevice>> {
    gstreamer::init()?;

    let monitor = gstreamer::DeviceMonitor::new();
    monitor.add_filter(Some("Video/Source"), None);
    monitor
        .start()
        .map_err(|e| BackendError::NotAvailable(e.to_string()))?;

    let mut cameras: Vec<CameraDevice> = Vec::new();

    for device in monitor.devices() {
        let name = device.display_name().to_string();
        let Some(props) = device.properties() else {
            debug!(name = %name, "Device without properties, skipping");
            continue;
        };

        let api = props.get::<String>("device.api").unwrap_or_default();
        let camera = match api.as_str() {
            "pipewire" => {
                let Ok(serial) = props
                    .get::<String>("object.serial")
                    .or_else(|_| props.get::<String>("node.name"))
                else {
                    continue;
                };
                CameraDevice {
                    name,
                    path: serial,
                    source: SourceKind::PipeWire,
                }
            }
            "v4l2" => {
                let Ok(path) = props
                    .get::<String>("api.v4l2.path")
                    .or_else(|_| props.get::<String>("device.path"))
                else {
                    continue;
                };
                CameraDevice {
                    name,
                    path,
                    source: SourceKind::V4l2,
                }
            }
            other => {
                debug!(name = %name, api = other, "Unsupported device api");
                continue;
            }
        };

        if camera.source == SourceKind::V4l2
            && cameras
                .iter()
                .any(|c| c.source == SourceKind::PipeWire && c.name == camera.name)
        {
            continue;
        }

        info!(camera = %camera, "Found camera");
        cameras.push(camera);
    }

    monitor.stop();

    Ok(cameras)
}
