use thiserror::Error;

/// Errors that can occur during speech capture operations.
///
/// Configuration and precondition violations are reported synchronously to
/// the caller of the violating operation; nothing in the core retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot start recording: no consumers attached")]
    NoConsumers,

    #[error("already recording")]
    AlreadyRecording,

    #[error("consumer signaled completion more than once")]
    DuplicateCompletion,

    #[error("audio device not available")]
    DeviceNotAvailable,

    #[error("permission denied")]
    PermissionDenied,

    #[error("device error: {0}")]
    DeviceFailed(String),

    #[error("resampler worker is not running")]
    WorkerStopped,
}
