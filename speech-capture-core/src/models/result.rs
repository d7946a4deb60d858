use serde::{Deserialize, Serialize};

use super::audio::SampleBlock;

/// Result delivered when every consumer of a recording session has signaled
/// completion.
///
/// `parts` holds one entry per attached consumer, in registration order; a
/// consumer that produced nothing contributes an empty sequence.
/// Serializable for handing off to an upload sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingResult {
    /// Token identifying this recording toward the upload service.
    pub session_token: String,

    /// RFC 3339 timestamp of when the session finished.
    pub created_at: String,

    /// Per-consumer raw sample sequences, in registration order.
    pub parts: Vec<Vec<SampleBlock>>,
}

impl RecordingResult {
    pub fn new(parts: Vec<Vec<SampleBlock>>) -> Self {
        Self {
            session_token: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            parts,
        }
    }

    /// The first consumer's sample sequence, conventionally the storage
    /// consumer attached by the capture service.
    pub fn primary(&self) -> Option<&[SampleBlock]> {
        self.parts.first().map(Vec::as_slice)
    }
}
