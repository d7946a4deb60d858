//! Input device enumeration.

use cpal::traits::{DeviceTrait, HostTrait};

use speech_capture_core::models::audio::AudioDeviceInfo;

/// List the input devices visible on the default host.
///
/// Devices whose name cannot be queried are skipped. Returns an empty list
/// when the host exposes no inputs (or enumeration itself fails).
pub fn list_input_devices() -> Vec<AudioDeviceInfo> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|device| device.name().ok());

    let Ok(devices) = host.input_devices() else {
        return Vec::new();
    };

    devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            Some(AudioDeviceInfo {
                id: name.clone(),
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
            })
        })
        .collect()
}
