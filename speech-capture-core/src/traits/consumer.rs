use std::sync::Arc;

use crate::models::audio::{OutputBuffer, SampleBlock};
use crate::session::capture::CompletionHandle;

/// A consumer of the capture stream.
///
/// Every attached consumer receives each raw block in capture order, and
/// optionally each processed buffer. All methods are called from the
/// session's dispatch thread; `on_stop` arrives strictly after every block
/// destined for this consumer in the session.
///
/// `on_stop` may be invoked more than once and must be idempotent, but the
/// consumer must signal completion through the handle exactly once per
/// session — including the empty-but-valid case where it never received
/// data. Completing twice is a contract violation the handle rejects.
pub trait Consumer: Send {
    /// A new recording session is starting; reset any per-session state.
    fn on_start(&mut self) {}

    /// One raw stereo block, in arrival order.
    fn receive_raw(&mut self, block: &SampleBlock);

    /// One completed decimated buffer. Consumers that only want raw data
    /// ignore this channel.
    fn receive_processed(&mut self, _buffer: &OutputBuffer) {}

    /// The session is stopping: finalize and signal completion via
    /// `completion`. The handle may be kept and completed later from
    /// another thread; completion does not have to happen inside this call.
    fn on_stop(&mut self, completion: Arc<CompletionHandle>);
}
