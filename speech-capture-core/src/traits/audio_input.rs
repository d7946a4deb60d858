use std::sync::Arc;

use crate::models::audio::{AudioDeviceInfo, SampleBlock};
use crate::models::error::CaptureError;

/// Callback invoked once per device buffer with a stereo sample block.
///
/// Fires on a thread owned by the backend — keep processing minimal and
/// hand the block off to the session's channels.
pub type BlockCallback = Arc<dyn Fn(SampleBlock) + Send + Sync + 'static>;

/// Interface for platform-specific audio acquisition.
///
/// Implemented by `speech-capture-cpal`'s microphone backend; test doubles
/// implement it to drive a session deterministically.
pub trait AudioInput {
    /// Whether this input source is currently available.
    fn is_available(&self) -> bool;

    /// Native sample rate of the device stream in Hz.
    fn sample_rate(&self) -> u32;

    /// Start delivering sample blocks via `callback`.
    fn start(&mut self, callback: BlockCallback) -> Result<(), CaptureError>;

    /// Stop delivery and release the stream. After this returns, the
    /// callback fires no more.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Information about the device backing this input.
    fn device_info(&self) -> AudioDeviceInfo;
}
