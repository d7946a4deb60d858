use crate::models::result::RecordingResult;

/// Destination for finished recordings (e.g. an upload client).
///
/// Fire-and-forget: the core neither awaits nor inspects a response, and
/// never retries. The session token travels inside the result.
/// Implementations may bound the payload size they accept.
pub trait RecordingSink: Send + Sync {
    fn send_recording(&self, recording: &RecordingResult);
}
