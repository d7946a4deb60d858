use serde::{Deserialize, Serialize};

/// Default decimation target, the rate fixed downstream speech decoders
/// expect.
pub const DEFAULT_OUTPUT_SAMPLE_RATE: u32 = 16_000;

/// Default number of samples per emitted output buffer.
pub const DEFAULT_OUTPUT_BUFFER_LENGTH: usize = 4096;

/// Configuration for the streaming resampler.
///
/// Immutable for the lifetime of a recording session; re-supplied only via
/// an explicit reinitialization of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResamplerConfig {
    /// Device sample rate in Hz.
    pub input_sample_rate: u32,

    /// Decimation target in Hz (default: 16000).
    pub output_sample_rate: u32,

    /// Samples per emitted output buffer.
    pub output_buffer_length: usize,
}

impl ResamplerConfig {
    pub fn new(input_sample_rate: u32, output_buffer_length: usize) -> Self {
        Self {
            input_sample_rate,
            output_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            output_buffer_length,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.input_sample_rate == 0 {
            return Err("input sample rate must be positive".into());
        }
        if self.output_sample_rate == 0 {
            return Err("output sample rate must be positive".into());
        }
        if self.output_buffer_length == 0 {
            return Err("output buffer length must be positive".into());
        }
        Ok(())
    }
}

/// Session-level capture settings.
///
/// The device's native rate is only known once a device is attached, so the
/// session combines these with the device rate to form a [`ResamplerConfig`]
/// when recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub output_sample_rate: u32,
    pub output_buffer_length: usize,
}

impl SessionConfig {
    pub fn resampler_config(&self, input_sample_rate: u32) -> ResamplerConfig {
        ResamplerConfig {
            input_sample_rate,
            output_sample_rate: self.output_sample_rate,
            output_buffer_length: self.output_buffer_length,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            output_buffer_length: DEFAULT_OUTPUT_BUFFER_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = ResamplerConfig::new(44_100, 4);
        assert!(config.validate().is_ok());
        assert_eq!(config.output_sample_rate, 16_000);
    }

    #[test]
    fn zero_input_rate_rejected() {
        let config = ResamplerConfig::new(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_output_rate_rejected() {
        let mut config = ResamplerConfig::new(44_100, 4);
        config.output_sample_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_buffer_length_rejected() {
        let config = ResamplerConfig::new(44_100, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_config_carries_device_rate() {
        let session = SessionConfig::default();
        let resampler = session.resampler_config(48_000);
        assert_eq!(resampler.input_sample_rate, 48_000);
        assert_eq!(resampler.output_sample_rate, 16_000);
        assert_eq!(resampler.output_buffer_length, DEFAULT_OUTPUT_BUFFER_LENGTH);
    }
}
