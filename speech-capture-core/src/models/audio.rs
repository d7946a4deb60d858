use serde::{Deserialize, Serialize};

/// One device-delivered chunk of stereo floating-point audio.
///
/// Both channels hold the same number of samples; a block is immutable once
/// emitted and crosses thread boundaries by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBlock {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl SampleBlock {
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "channel length mismatch");
        Self { left, right }
    }

    /// Build a block from interleaved device samples.
    ///
    /// Channel 0 becomes the left channel. A mono source is duplicated into
    /// both channels (the way a mono input feeds both sides of a stereo
    /// graph); channels beyond the second are ignored.
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Self {
        if channels <= 1 {
            return Self {
                left: samples.to_vec(),
                right: samples.to_vec(),
            };
        }

        let frame_count = samples.len() / channels;
        let mut left = Vec::with_capacity(frame_count);
        let mut right = Vec::with_capacity(frame_count);
        for frame in 0..frame_count {
            left.push(samples[frame * channels]);
            right.push(samples[frame * channels + 1]);
        }
        Self { left, right }
    }

    /// Number of sample frames in this block.
    pub fn frames(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

/// A fixed-length, decimated 16-bit mono buffer ready for downstream
/// speech processing.
///
/// `is_silent` is a property of the whole buffer: set iff every sample is
/// exactly zero. Silence is informational, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBuffer {
    pub samples: Vec<i16>,
    pub is_silent: bool,
}

impl OutputBuffer {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}
