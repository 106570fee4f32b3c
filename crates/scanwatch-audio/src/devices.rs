//! Input device enumeration and radio auto-detection

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Device;
use scanwatch_core::AudioSourceError;
use tracing::{debug, info};

/// Name fragments that identify the radio's USB sound interface
const RADIO_DEVICE_HINTS: [&str; 3] = ["IC-705", "ICOM", "USB Audio CODEC"];

/// Names of all available input devices, for startup logs and diagnostics
pub fn input_device_names() -> Result<Vec<String>, AudioSourceError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AudioSourceError::Stream(e.to_string()))?;
    Ok(devices
        .filter_map(|d| d.name().ok())
        .collect())
}

/// Resolve the configured input device.
///
/// A non-negative `device_index` selects that input device directly; -1 means
/// auto-detect: the first input device whose name contains one of the radio
/// hints, case-insensitive.
pub fn find_input_device(device_index: i32) -> Result<Device, AudioSourceError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AudioSourceError::Stream(e.to_string()))?;

    if device_index >= 0 {
        return devices
            .into_iter()
            .nth(device_index as usize)
            .ok_or_else(|| {
                AudioSourceError::NoDevice(format!("no input device at index {device_index}"))
            });
    }

    for device in devices {
        let name = match device.name() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if matches_radio_hint(&name) {
            info!(device = %name, "auto-detected radio audio device");
            return Ok(device);
        }
        debug!(device = %name, "input device did not match radio hints");
    }

    Err(AudioSourceError::NoDevice(format!(
        "no input device matching {RADIO_DEVICE_HINTS:?}"
    )))
}

fn matches_radio_hint(name: &str) -> bool {
    let lower = name.to_lowercase();
    RADIO_DEVICE_HINTS
        .iter()
        .any(|hint| lower.contains(&hint.to_lowercase()))
}
