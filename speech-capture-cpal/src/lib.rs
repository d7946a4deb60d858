//! # speech-capture-cpal
//!
//! cpal microphone backend for speech-capture-kit.
//!
//! Provides:
//! - `MicrophoneInput` — default-device microphone capture implementing the
//!   core's `AudioInput` trait
//! - `devices` — input device enumeration
//!
//! ## Usage
//! ```ignore
//! use speech_capture_core::{CaptureService, SessionConfig};
//! use speech_capture_cpal::MicrophoneInput;
//!
//! let mic = MicrophoneInput::default_device()?;
//! let mut service = CaptureService::new(mic, SessionConfig::default());
//! service.start_recording()?;
//! ```

pub mod devices;
pub mod input;

pub use devices::list_input_devices;
pub use input::MicrophoneInput;
