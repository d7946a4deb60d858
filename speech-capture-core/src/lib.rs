//! # speech-capture-core
//!
//! Platform-agnostic speech capture core library.
//!
//! Converts live microphone audio into fixed-size, 16 kHz 16-bit buffers
//! for downstream speech processing while fanning the raw stream out to
//! independent consumers, and synchronizes their completion behind a
//! counting barrier before a recording is considered finished.
//!
//! Platform-specific audio backends (e.g. the cpal microphone in
//! `speech-capture-cpal`) implement the `AudioInput` trait and plug into
//! the generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! speech-capture-core (this crate)
//! ├── traits/       ← AudioInput, Consumer, RecordingSink
//! ├── models/       ← CaptureError, SessionState, configs, SampleBlock, RecordingResult
//! ├── processing/   ← StreamingResampler (mixdown + bin-average decimation)
//! ├── worker/       ← ResamplerWorker thread + command/event protocol
//! ├── session/      ← CaptureSession orchestrator, CompletionBarrier
//! ├── consumers/    ← StorageConsumer
//! └── service.rs    ← CaptureService (top-level context object)
//! ```

pub mod consumers;
pub mod models;
pub mod processing;
pub mod service;
pub mod session;
pub mod traits;
pub mod worker;

// Re-export key types at crate root for convenience.
pub use consumers::storage::StorageConsumer;
pub use models::audio::{AudioDeviceInfo, OutputBuffer, SampleBlock};
pub use models::config::{ResamplerConfig, SessionConfig};
pub use models::error::CaptureError;
pub use models::result::RecordingResult;
pub use models::state::SessionState;
pub use processing::resampler::StreamingResampler;
pub use service::CaptureService;
pub use session::barrier::CompletionBarrier;
pub use session::capture::{CaptureSession, CompletionHandle};
pub use traits::audio_input::{AudioInput, BlockCallback};
pub use traits::consumer::Consumer;
pub use traits::recording_sink::RecordingSink;
pub use worker::{ResamplerCommand, ResamplerEvent, ResamplerWorker};
