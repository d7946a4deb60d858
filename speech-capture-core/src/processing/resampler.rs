use crate::models::audio::{OutputBuffer, SampleBlock};
use crate::models::config::ResamplerConfig;
use crate::models::error::CaptureError;

/// Fixed-point scale applied during stereo-to-mono mixdown.
///
/// The channels are summed, not averaged, and scaled by exactly 16383.0.
/// The resulting amplitude doubling is part of the contract with the fixed
/// downstream decoder and must not be "corrected".
const MIX_SCALE: f32 = 16_383.0;

/// Stateful streaming decimator: stereo float blocks in, fixed-length 16-bit
/// mono buffers out.
///
/// Box-filter decimation: the mono stream is partitioned into contiguous
/// bins whose boundaries follow the input/output rate ratio in truncating
/// integer arithmetic, and each output sample is the mean of its bin.
///
/// Unconsumed samples and both cursors persist across [`submit`] calls, so
/// feeding the same audio in one large block or many small ones yields the
/// same output sequence. Non-integer rate ratios neither drift nor lose
/// samples at call boundaries.
///
/// [`submit`]: StreamingResampler::submit
#[derive(Debug)]
pub struct StreamingResampler {
    config: ResamplerConfig,
    /// Mono samples awaiting decimation, already mixed and scaled.
    accumulator: Vec<f32>,
    /// Input samples drained from the front of the accumulator since init.
    consumed: u64,
    /// Output samples emitted since init.
    emitted: u64,
}

impl StreamingResampler {
    pub fn new(config: ResamplerConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfig)?;
        Ok(Self {
            config,
            accumulator: Vec::new(),
            consumed: 0,
            emitted: 0,
        })
    }

    pub fn config(&self) -> &ResamplerConfig {
        &self.config
    }

    /// Mono samples currently buffered, waiting for enough data to fill the
    /// next output buffer.
    pub fn pending_samples(&self) -> usize {
        self.accumulator.len()
    }

    /// Total mono samples consumed into emitted buffers since init.
    pub fn consumed_samples(&self) -> u64 {
        self.consumed
    }

    /// Mix a stereo block down to mono, append it to the accumulator, and
    /// emit every complete output buffer that becomes available.
    ///
    /// Partial buffers are never emitted; the leftover carry stays buffered
    /// for the next submission.
    pub fn submit(&mut self, block: &SampleBlock) -> Vec<OutputBuffer> {
        for (l, r) in block.left.iter().zip(&block.right) {
            self.accumulator.push((l + r) * MIX_SCALE);
        }

        let length = self.config.output_buffer_length as u64;
        let mut buffers = Vec::new();
        while self.bin_start(self.emitted + length) - self.consumed
            <= self.accumulator.len() as u64
        {
            buffers.push(self.emit_buffer());
        }
        buffers
    }

    /// Empty the accumulator and reset both cursors without emitting.
    pub fn clear(&mut self) {
        self.accumulator.clear();
        self.consumed = 0;
        self.emitted = 0;
    }

    /// Global input index where the bin for output sample `out_index` begins.
    fn bin_start(&self, out_index: u64) -> u64 {
        out_index * self.config.input_sample_rate as u64 / self.config.output_sample_rate as u64
    }

    fn emit_buffer(&mut self) -> OutputBuffer {
        let length = self.config.output_buffer_length;
        let mut samples = Vec::with_capacity(length);
        let mut is_silent = true;

        for _ in 0..length {
            let start = (self.bin_start(self.emitted) - self.consumed) as usize;
            let end = (self.bin_start(self.emitted + 1) - self.consumed) as usize;
            // A bin is empty when the output rate exceeds the input rate.
            let value = if end > start {
                let sum: f64 = self.accumulator[start..end].iter().map(|&s| s as f64).sum();
                (sum / (end - start) as f64) as i16
            } else {
                0
            };
            if value != 0 {
                is_silent = false;
            }
            samples.push(value);
            self.emitted += 1;
        }

        let cut = (self.bin_start(self.emitted) - self.consumed) as usize;
        self.accumulator.drain(..cut);
        self.consumed += cut as u64;

        OutputBuffer { samples, is_silent }
    }
}
