//! Microphone capture via cpal.
//!
//! Wraps the cpal host/device/stream lifecycle behind the core's
//! `AudioInput` trait. The stream delivers interleaved `f32` samples on a
//! backend-owned audio thread; each callback buffer becomes one
//! `SampleBlock`. Dropping the stream stops delivery, so `stop` is just a
//! teardown of the RAII handle.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use speech_capture_core::models::audio::{AudioDeviceInfo, SampleBlock};
use speech_capture_core::models::error::CaptureError;
use speech_capture_core::traits::audio_input::{AudioInput, BlockCallback};

/// Default-device microphone capture.
pub struct MicrophoneInput {
    device: cpal::Device,
    config: cpal::StreamConfig,
    device_name: String,
    sample_rate: u32,
    channels: u16,
    stream: Option<cpal::Stream>,
}

impl MicrophoneInput {
    /// Open the system default input device with its preferred stream
    /// configuration.
    pub fn default_device() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceNotAvailable)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Default Microphone".into());

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceFailed(format!("default input config: {e}")))?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(CaptureError::DeviceFailed(format!(
                "unsupported sample format: {:?}",
                supported.sample_format()
            )));
        }

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            device_name,
            sample_rate,
            channels,
            stream: None,
        })
    }
}

impl AudioInput for MicrophoneInput {
    fn is_available(&self) -> bool {
        cpal::default_host()
            .input_devices()
            .map(|mut devices| devices.next().is_some())
            .unwrap_or(false)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&mut self, callback: BlockCallback) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        let channels = self.channels as usize;
        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    callback(SampleBlock::from_interleaved(data, channels));
                },
                |err: cpal::StreamError| {
                    log::error!("cpal stream error: {err}");
                },
                None,
            )
            .map_err(|e| CaptureError::DeviceFailed(format!("build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| CaptureError::DeviceFailed(format!("start input stream: {e}")))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.stream = None;
        Ok(())
    }

    fn device_info(&self) -> AudioDeviceInfo {
        AudioDeviceInfo {
            id: self.device_name.clone(),
            name: self.device_name.clone(),
            is_default: true,
        }
    }
}
