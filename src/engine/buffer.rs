//! Audio Buffer Management
//!
//! Planar sample buffer handed to and returned from the crusher pipelines.
//! Samples are nominally in [-1.0, 1.0]; any channel count >= 1 is accepted.

use crate::error::{CrusherError, Result};

/// Default sample rate used when none is supplied
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type
///
/// Stores audio as non-interleaved 32-bit floating point samples.
/// Each channel is a separate `Vec<f32>`; all channels hold the same
/// number of frames once the buffer has passed [`AudioBuffer::validate_shape`].
///
/// # Example
/// ```
/// use crusher::engine::buffer::AudioBuffer;
///
/// let buffer = AudioBuffer::new(44100, 2, 44100);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.len(), 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is frames
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer with the given shape
    pub fn new(num_frames: usize, num_channels: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_frames]; num_channels],
            sample_rate,
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// `InvalidInput` if no channels are given, `ChannelMismatch` if the
    /// channels differ in length.
    pub fn from_planar(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let buffer = Self {
            samples: channels,
            sample_rate,
        };
        buffer.check_channels()?;
        Ok(buffer)
    }

    /// Create a buffer from interleaved sample data (L, R, L, R, ... for stereo)
    pub fn from_interleaved(
        interleaved: &[f32],
        num_channels: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if num_channels == 0 {
            return Err(CrusherError::InvalidInput {
                reason: "channel count must be at least 1".to_string(),
            });
        }

        if interleaved.len() % num_channels != 0 {
            return Err(CrusherError::InvalidInput {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_frames); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.channels() * self.len());

        for frame in 0..self.len() {
            for channel in &self.samples {
                interleaved.push(channel[frame]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of frames (samples per channel)
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Get a sample at the specified channel and frame
    #[inline]
    pub fn get_sample(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples
            .get(channel)
            .and_then(|ch| ch.get(index).copied())
    }

    /// Set a sample at the specified channel and frame
    ///
    /// Returns false if the indices are out of bounds.
    #[inline]
    pub fn set_sample(&mut self, channel: usize, index: usize, value: f32) -> bool {
        if let Some(ch) = self.samples.get_mut(channel) {
            if let Some(sample) = ch.get_mut(index) {
                *sample = value;
                return true;
            }
        }
        false
    }

    /// Iterate over every sample frame by frame (interleaved order)
    pub fn iter_samples(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len()).flat_map(move |frame| self.samples.iter().map(move |ch| ch[frame]))
    }

    /// Check that the buffer can be handed to a pipeline
    ///
    /// # Errors
    /// * `InvalidInput` - no channels
    /// * `ChannelMismatch` - channels of differing length
    /// * `EmptyBuffer` - zero frames
    pub fn validate_shape(&self) -> Result<()> {
        self.check_channels()?;
        if self.is_empty() {
            return Err(CrusherError::EmptyBuffer);
        }
        Ok(())
    }

    fn check_channels(&self) -> Result<()> {
        let expected = match self.samples.first() {
            Some(first) => first.len(),
            None => {
                return Err(CrusherError::InvalidInput {
                    reason: "buffer has no channels".to_string(),
                })
            }
        };

        if let Some(bad) = self.samples.iter().find(|ch| ch.len() != expected) {
            return Err(CrusherError::ChannelMismatch {
                expected,
                actual: bad.len(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Test Signals
// ============================================================================

/// Generate a sine tone with the same signal on every channel
pub fn generate_sine(
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
    num_channels: usize,
    sample_rate: u32,
) -> AudioBuffer {
    let num_frames = (duration_secs * sample_rate as f32).round() as usize;
    let tone: Vec<f32> = (0..num_frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (amplitude as f64 * (2.0 * std::f64::consts::PI * frequency as f64 * t).sin()) as f32
        })
        .collect();

    AudioBuffer {
        samples: vec![tone; num_channels],
        sample_rate,
    }
}
