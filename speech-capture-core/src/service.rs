use std::sync::Arc;

use crate::consumers::storage::StorageConsumer;
use crate::models::config::SessionConfig;
use crate::models::error::CaptureError;
use crate::models::result::RecordingResult;
use crate::session::capture::CaptureSession;
use crate::traits::audio_input::AudioInput;
use crate::traits::consumer::Consumer;
use crate::traits::recording_sink::RecordingSink;

/// Top-level capture context: one explicitly constructed object owning the
/// recording session and the optional upload sink.
///
/// This is the application's single entry point for speech capture —
/// construct it once at startup and pass it where needed. A storage
/// consumer is attached on construction, so the primary part of every
/// result is the full raw recording.
pub struct CaptureService<D: AudioInput> {
    session: CaptureSession<D>,
    sink: Option<Arc<dyn RecordingSink>>,
}

impl<D: AudioInput> CaptureService<D> {
    pub fn new(device: D, config: SessionConfig) -> Self {
        let session = CaptureSession::new(device, config);
        session
            .attach(Box::new(StorageConsumer::new()))
            .expect("fresh session is idle");
        Self {
            session,
            sink: None,
        }
    }

    /// Install the sink that receives every finished recording.
    pub fn set_sink(&mut self, sink: Arc<dyn RecordingSink>) {
        self.sink = Some(sink);
    }

    /// Register an additional consumer of the capture stream.
    pub fn attach_consumer(&self, consumer: Box<dyn Consumer>) -> Result<(), CaptureError> {
        self.session.attach(consumer)
    }

    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.session.start()
    }

    /// Stop recording; once all consumers complete, forward the result to
    /// the sink (fire-and-forget) and then to `on_result`.
    ///
    /// Empty recordings are not uploaded. A no-op unless recording.
    pub fn stop_recording<F>(&mut self, on_result: F)
    where
        F: FnOnce(RecordingResult) + Send + 'static,
    {
        let sink = self.sink.clone();
        self.session.stop(move |result| {
            if let Some(sink) = sink {
                if result.primary().is_some_and(|blocks| !blocks.is_empty()) {
                    sink.send_recording(&result);
                }
            }
            on_result(result);
        });
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }
}
