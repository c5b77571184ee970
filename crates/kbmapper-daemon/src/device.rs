//! Device enumeration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evdev::{Device, EventType};

/// What a device can report that the daemon cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Reports key events (keyboards, but also buttons)
    pub key: bool,
    /// Reports switch events (lid, headphone jack, ...)
    pub switch: bool,
}

impl Capabilities {
    pub fn of(device: &Device) -> Self {
        let events = device.supported_events();
        Self {
            key: events.contains(EventType::KEY),
            switch: events.contains(EventType::SWITCH),
        }
    }

    /// Whether the daemon should read from a device with these capabilities
    pub fn is_monitored(&self) -> bool {
        self.key || self.switch
    }
}

/// Directory holding the event device nodes
pub const INPUT_DIR: &str = "/dev/input";

/// Information about an input device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub capabilities: Capabilities,
}

impl DeviceInfo {
    pub fn of(path: PathBuf, device: &Device) -> Self {
        Self {
            path,
            name: device.name().unwrap_or("Unknown").to_string(),
            capabilities: Capabilities::of(device),
        }
    }
}

/// `event*` nodes in `dir`, sorted by path
pub fn event_device_paths(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Try to open every event device, keeping the outcome per node
pub fn open_all() -> Result<Vec<(PathBuf, std::io::Result<Device>)>> {
    let paths = event_device_paths(Path::new(INPUT_DIR))
        .with_context(|| format!("Failed to list {}", INPUT_DIR))?;

    Ok(paths
        .into_iter()
        .map(|path| {
            let device = Device::open(&path);
            (path, device)
        })
        .collect())
}

/// Open every event device that reports keys or switches.
///
/// Devices that cannot be opened are logged and left out.
pub fn enumerate_devices() -> Result<Vec<(DeviceInfo, Device)>> {
    let mut devices = Vec::new();

    for (path, opened) in open_all()? {
        match opened {
            Ok(device) => {
                let info = DeviceInfo::of(path, &device);

                if !info.capabilities.is_monitored() {
                    tracing::debug!(
                        "Ignoring '{}' at {}: no key or switch events",
                        info.name,
                        info.path.display()
                    );
                    continue;
                }

                devices.push((info, device));
            }
            Err(e) => {
                tracing::warn!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(devices)
}
