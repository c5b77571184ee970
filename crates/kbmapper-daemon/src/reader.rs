//! Per-device reader tasks

use std::sync::Arc;

use anyhow::{Context, Result};
use evdev::Device;
use tokio::sync::mpsc;

use crate::device::DeviceInfo;
use crate::engine::DeviceEvent;
use crate::frame::FrameCoalescer;

/// Start reading a device on its own task.
///
/// A read failure ends this task only; other devices keep running.
pub fn spawn_reader(
    info: DeviceInfo,
    device: Device,
    events: mpsc::Sender<DeviceEvent>,
) {
    tokio::spawn(async move {
        match read_device(&info, device, events).await {
            Ok(()) => {
                tracing::debug!("Stopped reading '{}'", info.name);
            }
            Err(e) => {
                tracing::warn!(
                    "Stopped reading '{}' at {}: {:#}",
                    info.name,
                    info.path.display(),
                    e
                );
            }
        }
    });
}

async fn read_device(
    info: &DeviceInfo,
    device: Device,
    events: mpsc::Sender<DeviceEvent>,
) -> Result<()> {
    let name: Arc<str> = Arc::from(info.name.as_str());

    let mut stream = device.into_event_stream().with_context(|| {
        format!(
            "Failed to create event stream for device '{}' at {}",
            info.name,
            info.path.display()
        )
    })?;

    let mut coalescer = FrameCoalescer::new();

    loop {
        let raw = stream
            .next_event()
            .await
            .with_context(|| format!("Event read error on {}", info.path.display()))?;

        if let Some(event) = coalescer.push(raw) {
            let event = DeviceEvent {
                device: Arc::clone(&name),
                event,
            };
            if events.send(event).await.is_err() {
                // Engine is gone, we are shutting down
                return Ok(());
            }
        }
    }
}
