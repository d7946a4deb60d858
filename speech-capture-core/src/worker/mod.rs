//! Dedicated resampler worker.
//!
//! The [`StreamingResampler`] runs on its own OS thread; the capture session
//! talks to it exclusively through FIFO message channels. Commands and
//! events are closed enums dispatched by exhaustive match, so an unknown
//! message is unrepresentable.
//!
//! Ordering contract: events are emitted in command order on a single
//! channel. The raw echo for a block always precedes any buffer derived
//! from it, and [`ResamplerEvent::Flushed`] follows every event produced by
//! commands sent before the [`ResamplerCommand::Flush`] that triggered it.

use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::models::audio::{OutputBuffer, SampleBlock};
use crate::models::config::ResamplerConfig;
use crate::models::error::CaptureError;
use crate::processing::resampler::StreamingResampler;

/// Commands accepted by the resampler worker.
#[derive(Debug, Clone)]
pub enum ResamplerCommand {
    /// (Re)initialize with a validated config, discarding any carry.
    Init(ResamplerConfig),
    /// Submit one device block for mixdown and decimation.
    Record(SampleBlock),
    /// Empty the accumulator without emitting.
    Clear,
    /// Request a `Flushed` event once all prior commands are processed.
    Flush,
}

/// Events emitted by the resampler worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ResamplerEvent {
    /// Verbatim echo of a submitted block, for raw-data consumers.
    RawData(SampleBlock),
    /// One completed fixed-length output buffer.
    NewBuffer(OutputBuffer),
    /// All commands sent before the corresponding `Flush` are processed.
    Flushed,
}

/// Handle to the resampler worker thread.
///
/// Dropping the handle closes the command channel and joins the thread.
pub struct ResamplerWorker {
    commands: Option<Sender<ResamplerCommand>>,
    events: Receiver<ResamplerEvent>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ResamplerWorker {
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("resampler-worker".into())
            .spawn(move || run(command_rx, event_tx))
            .expect("failed to spawn resampler thread");

        Self {
            commands: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
        }
    }

    /// Validate `config` on the calling thread, then reinitialize the worker.
    ///
    /// Validation errors are synchronous; the worker never sees an invalid
    /// config.
    pub fn initialize(&self, config: ResamplerConfig) -> Result<(), CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfig)?;
        self.send(ResamplerCommand::Init(config))
    }

    pub fn record(&self, block: SampleBlock) -> Result<(), CaptureError> {
        self.send(ResamplerCommand::Record(block))
    }

    pub fn clear(&self) -> Result<(), CaptureError> {
        self.send(ResamplerCommand::Clear)
    }

    pub fn flush(&self) -> Result<(), CaptureError> {
        self.send(ResamplerCommand::Flush)
    }

    /// A receiver for the worker's event stream. Receivers share one FIFO
    /// queue, so exactly one receiver should drain it at a time.
    pub fn events(&self) -> Receiver<ResamplerEvent> {
        self.events.clone()
    }

    fn send(&self, command: ResamplerCommand) -> Result<(), CaptureError> {
        self.commands
            .as_ref()
            .ok_or(CaptureError::WorkerStopped)?
            .send(command)
            .map_err(|_| CaptureError::WorkerStopped)
    }
}

impl Drop for ResamplerWorker {
    fn drop(&mut self) {
        self.commands = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(commands: Receiver<ResamplerCommand>, events: Sender<ResamplerEvent>) {
    let mut engine: Option<StreamingResampler> = None;

    for command in commands {
        match command {
            ResamplerCommand::Init(config) => match StreamingResampler::new(config) {
                Ok(fresh) => engine = Some(fresh),
                Err(e) => {
                    log::error!("resampler init rejected: {e}");
                    engine = None;
                }
            },
            ResamplerCommand::Record(block) => {
                let Some(engine) = engine.as_mut() else {
                    log::warn!("dropping sample block received before init");
                    continue;
                };
                if events.send(ResamplerEvent::RawData(block.clone())).is_err() {
                    return;
                }
                for buffer in engine.submit(&block) {
                    if events.send(ResamplerEvent::NewBuffer(buffer)).is_err() {
                        return;
                    }
                }
            }
            ResamplerCommand::Clear => {
                if let Some(engine) = engine.as_mut() {
                    engine.clear();
                }
            }
            ResamplerCommand::Flush => {
                if events.send(ResamplerEvent::Flushed).is_err() {
                    return;
                }
            }
        }
    }
}
