use std::sync::Arc;

use crate::models::audio::SampleBlock;
use crate::session::capture::CompletionHandle;
use crate::traits::consumer::Consumer;

/// Consumer that stores every raw block handed to it, in arrival order.
///
/// On stop it completes with the accumulated sequence and empties itself;
/// [`clear`] resets it for reuse without reconstruction.
///
/// [`clear`]: StorageConsumer::clear
#[derive(Debug, Default)]
pub struct StorageConsumer {
    blocks: Vec<SampleBlock>,
    finished: bool,
}

impl StorageConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks stored so far in the current session.
    pub fn blocks(&self) -> &[SampleBlock] {
        &self.blocks
    }

    /// Discard stored blocks and rearm for another session.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.finished = false;
    }
}

impl Consumer for StorageConsumer {
    fn on_start(&mut self) {
        self.clear();
    }

    fn receive_raw(&mut self, block: &SampleBlock) {
        if !self.finished {
            self.blocks.push(block.clone());
        }
    }

    fn on_stop(&mut self, completion: Arc<CompletionHandle>) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = completion.complete(std::mem::take(&mut self.blocks)) {
            log::error!("storage consumer completion rejected: {e}");
        }
    }
}
