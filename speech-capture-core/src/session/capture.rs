use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::models::audio::SampleBlock;
use crate::models::config::SessionConfig;
use crate::models::error::CaptureError;
use crate::models::result::RecordingResult;
use crate::models::state::SessionState;
use crate::session::barrier::CompletionBarrier;
use crate::traits::audio_input::{AudioInput, BlockCallback};
use crate::traits::consumer::Consumer;
use crate::worker::{ResamplerEvent, ResamplerWorker};

type ResultCallback = Box<dyn FnOnce(RecordingResult) + Send + 'static>;

/// Completion machinery for one recording session: the counting barrier,
/// one result slot per consumer, and the result callback installed at stop.
struct SharedCompletion {
    barrier: CompletionBarrier,
    slots: Mutex<Vec<Option<Vec<SampleBlock>>>>,
    on_result: Mutex<Option<ResultCallback>>,
    state: Arc<Mutex<SessionState>>,
}

impl SharedCompletion {
    /// Aggregate all consumer results in registration order and deliver
    /// them. Reached exactly once per session, by the final barrier arrival.
    fn finish(&self) {
        let parts: Vec<Vec<SampleBlock>> = {
            let mut slots = self.slots.lock();
            slots.iter_mut().map(|slot| slot.take().unwrap_or_default()).collect()
        };
        let result = RecordingResult::new(parts);
        *self.state.lock() = SessionState::Idle;

        match self.on_result.lock().take() {
            Some(callback) => callback(result),
            None => log::warn!("recording finished with no result callback registered"),
        }
    }
}

/// One consumer's completion token for the current session.
///
/// [`complete`] may be called from any thread, but only once: the second
/// call on the same handle is rejected with
/// [`CaptureError::DuplicateCompletion`] and never re-triggers aggregation.
///
/// [`complete`]: CompletionHandle::complete
pub struct CompletionHandle {
    slot: usize,
    fired: AtomicBool,
    shared: Arc<SharedCompletion>,
}

impl CompletionHandle {
    /// Deposit this consumer's result and arrive at the session barrier.
    /// An empty `samples` is a valid completion.
    pub fn complete(&self, samples: Vec<SampleBlock>) -> Result<(), CaptureError> {
        if self.fired.swap(true, Ordering::AcqRel) {
            return Err(CaptureError::DuplicateCompletion);
        }
        self.shared.slots.lock()[self.slot] = Some(samples);
        if self.shared.barrier.arrive()? {
            self.shared.finish();
        }
        Ok(())
    }
}

/// Recording session orchestrator: owns the device, the resampler worker,
/// and the consumer set.
///
/// Data flow per session:
/// ```text
/// [AudioInput] → [ResamplerWorker] ─┬→ rawData   → every Consumer
///                                   └→ newBuffer → Consumers wanting processed data
/// ```
///
/// `stop` sends an in-band flush through the worker so each consumer sees
/// its stop strictly after all of its data, then a counting barrier gates
/// the single `on_result` delivery on every consumer's completion.
pub struct CaptureSession<D: AudioInput> {
    device: D,
    config: SessionConfig,
    worker: Arc<ResamplerWorker>,
    consumers: Arc<Mutex<Vec<Box<dyn Consumer>>>>,
    state: Arc<Mutex<SessionState>>,
    shared: Option<Arc<SharedCompletion>>,
    dispatch: Option<thread::JoinHandle<()>>,
}

impl<D: AudioInput> CaptureSession<D> {
    pub fn new(device: D, config: SessionConfig) -> Self {
        Self {
            device,
            config,
            worker: Arc::new(ResamplerWorker::spawn()),
            consumers: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            shared: None,
            dispatch: None,
        }
    }

    /// Register a consumer. Only allowed while idle; the set is fixed for
    /// the duration of a recording.
    pub fn attach(&self, consumer: Box<dyn Consumer>) -> Result<(), CaptureError> {
        {
            let state = self.state.lock();
            if !state.is_idle() {
                return Err(CaptureError::AlreadyRecording);
            }
        }
        self.consumers.lock().push(consumer);
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.state.lock().is_recording()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Start recording.
    ///
    /// Fails with [`CaptureError::NoConsumers`] on an empty consumer set and
    /// [`CaptureError::AlreadyRecording`] unless idle; either failure leaves
    /// the session state untouched. The resampler is reinitialized, so any
    /// carry from a previous session is discarded.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        {
            let state = self.state.lock();
            if !state.is_idle() {
                return Err(CaptureError::AlreadyRecording);
            }
        }
        let consumer_count = self.consumers.lock().len();
        if consumer_count == 0 {
            return Err(CaptureError::NoConsumers);
        }
        if !self.device.is_available() {
            return Err(CaptureError::DeviceNotAvailable);
        }

        if let Some(handle) = self.dispatch.take() {
            let _ = handle.join();
        }

        self.worker
            .initialize(self.config.resampler_config(self.device.sample_rate()))?;

        for consumer in self.consumers.lock().iter_mut() {
            consumer.on_start();
        }

        let shared = Arc::new(SharedCompletion {
            barrier: CompletionBarrier::new(consumer_count),
            slots: Mutex::new((0..consumer_count).map(|_| None).collect()),
            on_result: Mutex::new(None),
            state: Arc::clone(&self.state),
        });
        self.shared = Some(Arc::clone(&shared));

        let handles: Vec<Arc<CompletionHandle>> = (0..consumer_count)
            .map(|slot| {
                Arc::new(CompletionHandle {
                    slot,
                    fired: AtomicBool::new(false),
                    shared: Arc::clone(&shared),
                })
            })
            .collect();

        let events = self.worker.events();
        // Discard anything left over from a session aborted mid-start.
        while events.try_recv().is_ok() {}

        *self.state.lock() = SessionState::Recording;

        let state = Arc::clone(&self.state);
        let worker = Arc::clone(&self.worker);
        let callback: BlockCallback = Arc::new(move |block| {
            if !state.lock().is_recording() {
                return;
            }
            if let Err(e) = worker.record(block) {
                log::error!("failed to queue sample block: {e}");
            }
        });

        if let Err(e) = self.device.start(callback) {
            *self.state.lock() = SessionState::Idle;
            return Err(e);
        }

        self.dispatch = Some(spawn_dispatch(
            events,
            Arc::clone(&self.consumers),
            handles,
        ));
        Ok(())
    }

    /// Stop recording and deliver the aggregated result to `on_result` once
    /// every consumer has completed.
    ///
    /// A no-op unless currently recording. `on_result` is invoked from the
    /// thread of the final completion (usually the dispatch thread) —
    /// marshal elsewhere if needed.
    pub fn stop<F>(&mut self, on_result: F)
    where
        F: FnOnce(RecordingResult) + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if !state.is_recording() {
                return;
            }
            *state = SessionState::Stopping;
        }

        if let Err(e) = self.device.stop() {
            log::warn!("device stop failed: {e}");
        }

        if let Some(shared) = &self.shared {
            *shared.on_result.lock() = Some(Box::new(on_result));
        }

        if self.worker.flush().is_err() {
            log::error!("resampler worker unavailable; recording cannot finalize");
        }
    }
}

/// Fan worker events out to the consumer set until the session's flush
/// marker arrives, then issue every consumer its stop.
fn spawn_dispatch(
    events: Receiver<ResamplerEvent>,
    consumers: Arc<Mutex<Vec<Box<dyn Consumer>>>>,
    handles: Vec<Arc<CompletionHandle>>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("capture-dispatch".into())
        .spawn(move || {
            for event in events {
                match event {
                    ResamplerEvent::RawData(block) => {
                        for consumer in consumers.lock().iter_mut() {
                            consumer.receive_raw(&block);
                        }
                    }
                    ResamplerEvent::NewBuffer(buffer) => {
                        for consumer in consumers.lock().iter_mut() {
                            consumer.receive_processed(&buffer);
                        }
                    }
                    ResamplerEvent::Flushed => {
                        // Finalize without holding the registry lock: the
                        // last completion runs the result callback, which
                        // may call back into the session.
                        let mut taken = std::mem::take(&mut *consumers.lock());
                        for (consumer, handle) in taken.iter_mut().zip(handles.iter()) {
                            consumer.on_stop(Arc::clone(handle));
                        }
                        let mut registry = consumers.lock();
                        taken.extend(registry.drain(..));
                        *registry = taken;
                        break;
                    }
                }
            }
        })
        .expect("failed to spawn dispatch thread")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::models::audio::AudioDeviceInfo;

    const TIMEOUT: Duration = Duration::from_secs(2);

    // -- test doubles --

    type CallbackCell = Arc<Mutex<Option<BlockCallback>>>;

    struct FakeInput {
        rate: u32,
        available: bool,
        callback: CallbackCell,
    }

    impl FakeInput {
        fn new(rate: u32) -> (Self, FakeMic) {
            let callback: CallbackCell = Arc::new(Mutex::new(None));
            (
                Self {
                    rate,
                    available: true,
                    callback: Arc::clone(&callback),
                },
                FakeMic { callback },
            )
        }
    }

    /// Test-side handle that plays the role of the hardware callback driver.
    struct FakeMic {
        callback: CallbackCell,
    }

    impl FakeMic {
        fn push(&self, block: SampleBlock) {
            let callback = self.callback.lock().clone();
            if let Some(callback) = callback {
                callback(block);
            }
        }
    }

    impl AudioInput for FakeInput {
        fn is_available(&self) -> bool {
            self.available
        }

        fn sample_rate(&self) -> u32 {
            self.rate
        }

        fn start(&mut self, callback: BlockCallback) -> Result<(), CaptureError> {
            *self.callback.lock() = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), CaptureError> {
            *self.callback.lock() = None;
            Ok(())
        }

        fn device_info(&self) -> AudioDeviceInfo {
            AudioDeviceInfo {
                id: "fake".into(),
                name: "Fake Microphone".into(),
                is_default: true,
            }
        }
    }

    /// Completes immediately with an empty result.
    struct NoopConsumer {
        finished: bool,
    }

    impl NoopConsumer {
        fn new() -> Self {
            Self { finished: false }
        }
    }

    impl Consumer for NoopConsumer {
        fn on_start(&mut self) {
            self.finished = false;
        }

        fn receive_raw(&mut self, _block: &SampleBlock) {}

        fn on_stop(&mut self, completion: Arc<CompletionHandle>) {
            if self.finished {
                return;
            }
            self.finished = true;
            completion.complete(Vec::new()).unwrap();
        }
    }

    /// Defers completion to a background thread to exercise out-of-order
    /// barrier arrivals.
    struct SlowConsumer;

    impl Consumer for SlowConsumer {
        fn receive_raw(&mut self, _block: &SampleBlock) {}

        fn on_stop(&mut self, completion: Arc<CompletionHandle>) {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                completion.complete(Vec::new()).unwrap();
            });
        }
    }

    /// Counts processed buffers it receives.
    struct ProcessedCounter {
        count: Arc<AtomicUsize>,
        finished: bool,
    }

    impl Consumer for ProcessedCounter {
        fn on_start(&mut self) {
            self.finished = false;
        }

        fn receive_raw(&mut self, _block: &SampleBlock) {}

        fn receive_processed(&mut self, _buffer: &crate::models::audio::OutputBuffer) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        fn on_stop(&mut self, completion: Arc<CompletionHandle>) {
            if self.finished {
                return;
            }
            self.finished = true;
            completion.complete(Vec::new()).unwrap();
        }
    }

    fn block(value: f32, frames: usize) -> SampleBlock {
        SampleBlock::new(vec![value; frames], vec![value; frames])
    }

    // -- tests --

    #[test]
    fn start_without_consumers_fails_and_stays_idle() {
        let (device, _mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());

        assert_eq!(session.start(), Err(CaptureError::NoConsumers));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn start_while_recording_fails() {
        let (device, _mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session.attach(Box::new(NoopConsumer::new())).unwrap();

        session.start().unwrap();
        assert!(session.is_recording());
        assert_eq!(session.start(), Err(CaptureError::AlreadyRecording));
        assert!(session.is_recording());
    }

    #[test]
    fn attach_while_recording_fails() {
        let (device, _mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session.attach(Box::new(NoopConsumer::new())).unwrap();
        session.start().unwrap();

        assert_eq!(
            session.attach(Box::new(NoopConsumer::new())),
            Err(CaptureError::AlreadyRecording)
        );
    }

    #[test]
    fn start_with_unavailable_device_fails() {
        let (mut device, _mic) = FakeInput::new(16_000);
        device.available = false;
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session.attach(Box::new(NoopConsumer::new())).unwrap();

        assert_eq!(session.start(), Err(CaptureError::DeviceNotAvailable));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn stop_while_idle_is_a_noop() {
        let (device, _mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session.attach(Box::new(NoopConsumer::new())).unwrap();

        let (tx, rx) = mpsc::channel();
        session.stop(move |result| tx.send(result).unwrap());

        assert_eq!(session.state(), SessionState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn roundtrip_delivers_blocks_in_order() {
        let (device, mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session
            .attach(Box::new(crate::consumers::storage::StorageConsumer::new()))
            .unwrap();
        session.attach(Box::new(NoopConsumer::new())).unwrap();

        session.start().unwrap();
        let blocks: Vec<SampleBlock> = (1..=5).map(|i| block(i as f32 * 0.1, 4)).collect();
        for b in &blocks {
            mic.push(b.clone());
        }

        let (tx, rx) = mpsc::channel();
        session.stop(move |result| tx.send(result).unwrap());

        let result = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(result.parts.len(), 2);
        assert_eq!(result.parts[0], blocks);
        assert!(result.parts[1].is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn result_fires_once_after_all_consumers() {
        let (device, mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session.attach(Box::new(NoopConsumer::new())).unwrap();
        session.attach(Box::new(SlowConsumer)).unwrap();
        session.attach(Box::new(NoopConsumer::new())).unwrap();

        session.start().unwrap();
        mic.push(block(0.3, 8));

        let (tx, rx) = mpsc::channel();
        session.stop(move |result| tx.send(result).unwrap());

        let result = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(result.parts.len(), 3);
        // Exactly once: no second delivery.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn processed_buffers_reach_interested_consumers() {
        let (device, mic) = FakeInput::new(16_000);
        let config = SessionConfig {
            output_sample_rate: 16_000,
            output_buffer_length: 4,
        };
        let mut session = CaptureSession::new(device, config);

        let count = Arc::new(AtomicUsize::new(0));
        session
            .attach(Box::new(ProcessedCounter {
                count: Arc::clone(&count),
                finished: false,
            }))
            .unwrap();

        session.start().unwrap();
        // 1:1 rate: 12 mono samples fill three buffers of 4.
        mic.push(block(0.5, 12));

        let (tx, rx) = mpsc::channel();
        session.stop(move |result| tx.send(result).unwrap());
        rx.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn session_is_reusable_after_a_recording() {
        let (device, mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session
            .attach(Box::new(crate::consumers::storage::StorageConsumer::new()))
            .unwrap();

        for round in 1..=2 {
            session.start().unwrap();
            for _ in 0..round {
                mic.push(block(0.2, 4));
            }
            let (tx, rx) = mpsc::channel();
            session.stop(move |result| tx.send(result).unwrap());
            let result = rx.recv_timeout(TIMEOUT).unwrap();

            // The storage consumer restarts empty each session.
            assert_eq!(result.parts[0].len(), round);
        }
    }

    #[test]
    fn blocks_pushed_after_stop_are_ignored() {
        let (device, mic) = FakeInput::new(16_000);
        let mut session = CaptureSession::new(device, SessionConfig::default());
        session
            .attach(Box::new(crate::consumers::storage::StorageConsumer::new()))
            .unwrap();

        session.start().unwrap();
        mic.push(block(0.1, 4));

        let (tx, rx) = mpsc::channel();
        session.stop(move |result| tx.send(result).unwrap());
        mic.push(block(0.9, 4));

        let result = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(result.parts[0].len(), 1);
    }
}
