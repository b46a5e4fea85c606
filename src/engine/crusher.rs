//! Crusher Engine
//!
//! Pipeline orchestrator. Both pipelines run the same stages in the same
//! order: Quantize -> Alias -> Waveshape -> Noise -> Mix -> Clip.
//!
//! - [`CrusherEngine::process_full`]: f64 working precision, band-limited
//!   resampling, noise sd `amount * 0.1`. One call at a time per engine.
//! - [`CrusherEngine::process_chunk`]: f32 working precision, hold-and-repeat
//!   aliasing, noise sd `amount * 0.05`. Callers sequence chunk calls.
//!
//! The two pipelines are not bit-exact equivalents at equal parameters.
//! The caller's buffer is never modified; every call returns a fresh buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use num_traits::Float;
use rand::rngs::StdRng;
use rustfft::FftPlanner;
use rand::SeedableRng;
use tracing::debug;

use crate::dsp::analyzer::{self, AnalysisReport};
use crate::dsp::params::ProcessingParams;
use crate::dsp::{aliasing, mixer, noise, quantizer, waveshaper};
use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

/// Resets the processing flag when the exclusive section ends
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Bitcrusher engine instance
///
/// Owns its noise generators; production engines are seeded from entropy,
/// tests can use [`CrusherEngine::with_seed`] for reproducible noise.
#[derive(Debug)]
pub struct CrusherEngine {
    sample_rate: u32,
    /// Full-pipeline generator; the lock is the exclusive section
    full_rng: Mutex<StdRng>,
    chunk_rng: StdRng,
    is_processing: AtomicBool,
}

impl CrusherEngine {
    /// Create an engine with unseeded noise
    pub fn new(sample_rate: u32) -> Self {
        Self::from_rngs(sample_rate, StdRng::from_entropy(), StdRng::from_entropy())
    }

    /// Create an engine whose noise sequence is reproducible
    pub fn with_seed(sample_rate: u32, seed: u64) -> Self {
        Self::from_rngs(
            sample_rate,
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    fn from_rngs(sample_rate: u32, full_rng: StdRng, chunk_rng: StdRng) -> Self {
        Self {
            sample_rate,
            full_rng: Mutex::new(full_rng),
            chunk_rng,
            is_processing: AtomicBool::new(false),
        }
    }

    /// Sample rate the engine was configured with (informational)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// True while a `process_full` call is inside its exclusive section
    pub fn is_processing(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    /// Process a whole buffer for offline/export use
    ///
    /// # Errors
    /// Fails only for malformed buffers (no channels, ragged channels,
    /// zero frames). Parameters are clamped, never rejected.
    pub fn process_full(&self, buffer: &AudioBuffer, params: &ProcessingParams) -> Result<AudioBuffer> {
        buffer.validate_shape()?;
        self.check_rate(buffer);

        let mut rng = self.full_rng.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = ProcessingGuard::enter(&self.is_processing);

        let params = params.clamped();
        debug!(
            "process_full: {} frames x {} ch, {:?}",
            buffer.len(),
            buffer.channels(),
            params
        );

        let widen = |ch: &Vec<f32>| -> Vec<f64> { ch.iter().map(|&s| s as f64).collect() };
        let mut wet: Vec<Vec<f64>> = buffer.samples.iter().map(widen).collect();
        // The dry copy is only read by the blend
        let dry: Option<Vec<Vec<f64>>> =
            mixer::needs_dry(params.mix).then(|| buffer.samples.iter().map(widen).collect());

        let mut planner = FftPlanner::<f64>::new();
        for channel in wet.iter_mut() {
            quantizer::reduce_bit_depth(channel, params.bit_depth);
            if !aliasing::is_bypass(params.downsample_factor) {
                *channel =
                    aliasing::downsample_and_upsample_with(&mut planner, channel, params.downsample_factor);
            }
            waveshaper::apply_waveshaping(channel, params.waveshape);
            noise::add_noise(channel, params.noise, noise::FULL_NOISE_SCALE, &mut *rng);
        }

        Ok(finish(wet, dry.as_deref(), params.mix, buffer.sample_rate))
    }

    /// Process a short block for the low-latency playback path
    ///
    /// Same stage order and parameter meaning as [`Self::process_full`],
    /// at f32 precision and with hold-and-repeat in place of resampling.
    pub fn process_chunk(&mut self, buffer: &AudioBuffer, params: &ProcessingParams) -> Result<AudioBuffer> {
        buffer.validate_shape()?;

        let params = params.clamped();
        let mut wet = buffer.samples.clone();

        for channel in wet.iter_mut() {
            quantizer::reduce_bit_depth(channel, params.bit_depth);
            aliasing::hold_and_repeat(channel, params.downsample_factor);
            waveshaper::apply_waveshaping(channel, params.waveshape);
            noise::add_noise(channel, params.noise, noise::CHUNK_NOISE_SCALE, &mut self.chunk_rng);
        }

        Ok(finish(wet, Some(buffer.samples.as_slice()), params.mix, buffer.sample_rate))
    }

    // ========================================================================
    // Individual stages (full precision)
    // ========================================================================

    /// Quantize a buffer to `bit_depth` bits
    pub fn reduce_bit_depth(&self, buffer: &AudioBuffer, bit_depth: u32) -> Result<AudioBuffer> {
        self.map_stage(buffer, |channel| {
            quantizer::reduce_bit_depth(channel, bit_depth);
        })
    }

    /// Band-limited down/up resample of every channel
    pub fn downsample_and_upsample(&self, buffer: &AudioBuffer, factor: f64) -> Result<AudioBuffer> {
        let mut planner = FftPlanner::<f64>::new();
        self.map_stage(buffer, |channel| {
            *channel = aliasing::downsample_and_upsample_with(&mut planner, channel, factor);
        })
    }

    /// Apply the tanh soft-clip curve
    pub fn apply_waveshaping(&self, buffer: &AudioBuffer, drive: f64) -> Result<AudioBuffer> {
        self.map_stage(buffer, |channel| {
            waveshaper::apply_waveshaping(channel, drive);
        })
    }

    /// Add Gaussian noise with the full-pipeline scale
    pub fn add_noise(&self, buffer: &AudioBuffer, amount: f64) -> Result<AudioBuffer> {
        let mut rng = self.full_rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.map_stage(buffer, |channel| {
            noise::add_noise(channel, amount, noise::FULL_NOISE_SCALE, &mut *rng);
        })
    }

    /// Read-only metrics for a buffer
    pub fn analyze(&self, buffer: &AudioBuffer) -> AnalysisReport {
        analyzer::analyze(buffer)
    }

    /// Run one stage over an f64 copy of every channel, without mixing or clipping
    fn map_stage<F>(&self, buffer: &AudioBuffer, mut stage: F) -> Result<AudioBuffer>
    where
        F: FnMut(&mut Vec<f64>),
    {
        buffer.validate_shape()?;

        let samples: Vec<Vec<f32>> = buffer
            .samples
            .iter()
            .map(|ch| {
                let mut work: Vec<f64> = ch.iter().map(|&s| s as f64).collect();
                stage(&mut work);
                work.into_iter().map(|s| s as f32).collect()
            })
            .collect();

        Ok(AudioBuffer {
            samples,
            sample_rate: buffer.sample_rate,
        })
    }

    fn check_rate(&self, buffer: &AudioBuffer) {
        if buffer.sample_rate != self.sample_rate {
            debug!(
                "buffer sample rate {} Hz differs from engine rate {} Hz",
                buffer.sample_rate, self.sample_rate
            );
        }
    }
}

impl Default for CrusherEngine {
    fn default() -> Self {
        Self::new(crate::engine::buffer::DEFAULT_SAMPLE_RATE)
    }
}

/// Mix, clip and narrow the working channels into an output buffer
///
/// `dry` may be `None` when the mix is fully wet.
fn finish<T>(mut wet: Vec<Vec<T>>, dry: Option<&[Vec<T>]>, mix: f64, sample_rate: u32) -> AudioBuffer
where
    T: Float + Into<f64>,
{
    if let Some(dry) = dry {
        for (wet_ch, dry_ch) in wet.iter_mut().zip(dry.iter()) {
            mixer::blend(wet_ch, dry_ch, mix);
        }
    }
    for wet_ch in wet.iter_mut() {
        mixer::clip(wet_ch);
    }

    let samples: Vec<Vec<f32>> = wet
        .into_iter()
        .map(|ch| ch.into_iter().map(|s| Into::<f64>::into(s) as f32).collect())
        .collect();

    AudioBuffer {
        samples,
        sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::generate_sine;
    use crate::error::CrusherError;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_bypass_is_bit_exact() {
        let engine = CrusherEngine::with_seed(44100, 1);
        let input = generate_sine(440.0, 0.9, 0.1, 2, 44100);
        let params = ProcessingParams::bypass();

        assert_eq!(engine.process_full(&input, &params).unwrap(), input);
        let mut engine = engine;
        assert_eq!(engine.process_chunk(&input, &params).unwrap(), input);
    }

    #[test]
    fn test_input_not_mutated() {
        let engine = CrusherEngine::with_seed(44100, 2);
        let input = generate_sine(440.0, 0.9, 0.05, 2, 44100);
        let snapshot = input.clone();
        let params = ProcessingParams {
            bit_depth: 3,
            downsample_factor: 4.0,
            mix: 0.5,
            waveshape: 0.7,
            noise: 0.5,
        };
        let output = engine.process_full(&input, &params).unwrap();
        assert_eq!(input, snapshot);
        assert_ne!(output, input);
        assert_eq!(output.len(), input.len());
        assert_eq!(output.channels(), input.channels());
    }

    #[test]
    fn test_partial_mix_blends_against_dry() {
        let engine = CrusherEngine::with_seed(44100, 13);
        let input = generate_sine(440.0, 0.6, 0.02, 2, 44100);
        let wet_params = ProcessingParams {
            bit_depth: 3,
            downsample_factor: 2.0,
            mix: 1.0,
            waveshape: 0.3,
            noise: 0.0,
        };
        let half_params = ProcessingParams { mix: 0.5, ..wet_params };

        let wet = engine.process_full(&input, &wet_params).unwrap();
        let half = engine.process_full(&input, &half_params).unwrap();
        for ((h, w), d) in half.iter_samples().zip(wet.iter_samples()).zip(input.iter_samples()) {
            approx::assert_abs_diff_eq!(h, 0.5 * w + 0.5 * d, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let mut engine = CrusherEngine::with_seed(44100, 3);
        let empty = AudioBuffer::new(0, 2, 44100);
        let params = ProcessingParams::default();

        assert!(matches!(engine.process_full(&empty, &params), Err(CrusherError::EmptyBuffer)));
        assert!(matches!(engine.process_chunk(&empty, &params), Err(CrusherError::EmptyBuffer)));
        assert!(!engine.is_processing());
    }

    #[test]
    fn test_single_frame_buffer() {
        let engine = CrusherEngine::with_seed(44100, 4);
        let input = AudioBuffer::from_planar(vec![vec![0.5], vec![-0.5]], 44100).unwrap();
        let params = ProcessingParams {
            downsample_factor: 16.0,
            ..ProcessingParams::default()
        };
        let output = engine.process_full(&input, &params).unwrap();
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_chunk_hold_and_repeat_per_channel() {
        let mut engine = CrusherEngine::with_seed(44100, 5);
        let input = AudioBuffer::from_planar(
            vec![vec![0.1, 0.2, 0.3, 0.4], vec![-0.1, -0.2, -0.3, -0.4]],
            44100,
        )
        .unwrap();
        let params = ProcessingParams {
            bit_depth: 16,
            downsample_factor: 2.0,
            ..ProcessingParams::default()
        };
        let output = engine.process_chunk(&input, &params).unwrap();
        assert_eq!(output.channel(0), &[0.1, 0.1, 0.3, 0.3]);
        assert_eq!(output.channel(1), &[-0.1, -0.1, -0.3, -0.3]);
    }

    #[test]
    fn test_stage_entry_points_match_dsp() {
        let engine = CrusherEngine::with_seed(44100, 6);
        let input = generate_sine(440.0, 0.5, 0.01, 1, 44100);

        let crushed = engine.reduce_bit_depth(&input, 16).unwrap();
        assert_eq!(crushed, input);

        let aliased = engine.downsample_and_upsample(&input, 1.0).unwrap();
        assert_eq!(aliased, input);

        let shaped = engine.apply_waveshaping(&input, 0.5).unwrap();
        let expected = ((input.channel(0)[10] as f64 * 2.5).tanh() * 0.8) as f32;
        assert_eq!(shaped.channel(0)[10], expected);

        let noisy = engine.add_noise(&input, 0.0).unwrap();
        assert_eq!(noisy, input);
    }

    #[test]
    fn test_seeded_engines_reproducible() {
        let input = AudioBuffer::new(256, 1, 44100);
        let params = ProcessingParams {
            bit_depth: 16,
            noise: 0.3,
            ..ProcessingParams::default()
        };
        let a = CrusherEngine::with_seed(44100, 9).process_full(&input, &params).unwrap();
        let b = CrusherEngine::with_seed(44100, 9).process_full(&input, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_calls_are_serialized() {
        let engine = Arc::new(CrusherEngine::with_seed(44100, 10));
        let input = generate_sine(220.0, 0.8, 0.05, 2, 44100);
        let params = ProcessingParams {
            downsample_factor: 3.0,
            noise: 0.1,
            ..ProcessingParams::default()
        };

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let input = input.clone();
                thread::spawn(move || engine.process_full(&input, &params).unwrap())
            })
            .collect();

        for handle in handles {
            let output = handle.join().unwrap();
            assert_eq!(output.len(), input.len());
        }
        assert!(!engine.is_processing());
    }

    #[test]
    fn test_full_call_waits_for_exclusive_section() {
        let engine = Arc::new(CrusherEngine::with_seed(44100, 11));
        let input = generate_sine(220.0, 0.8, 0.05, 2, 44100);
        let params = ProcessingParams::default();

        let held = engine.full_rng.lock().unwrap();
        let (tx, rx) = mpsc::channel();
        let worker = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let output = engine.process_full(&input, &params);
                tx.send(()).unwrap();
                output
            })
        };

        // Blocked on the section, so it has neither started nor finished
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!engine.is_processing());

        drop(held);
        rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert!(worker.join().unwrap().is_ok());
        assert!(!engine.is_processing());
    }

    #[test]
    fn test_processing_flag_implies_section_held() {
        let engine = Arc::new(CrusherEngine::with_seed(44100, 12));
        let input = generate_sine(220.0, 0.8, 1.0, 2, 44100);
        let params = ProcessingParams {
            downsample_factor: 3.0,
            noise: 0.1,
            ..ProcessingParams::default()
        };

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let input = input.clone();
                thread::spawn(move || engine.process_full(&input, &params).unwrap())
            })
            .collect();

        let deadline = Instant::now() + Duration::from_secs(60);
        let mut seen_busy = false;
        while !workers.iter().all(|w| w.is_finished()) && Instant::now() < deadline {
            seen_busy |= engine.is_processing();
            // The flag is only raised by the lock holder, so it must be down
            // whenever this thread owns the section
            if let Ok(_section) = engine.full_rng.try_lock() {
                assert!(!engine.is_processing(), "flag raised outside the section");
            }
            thread::yield_now();
        }

        for worker in workers {
            assert_eq!(worker.join().unwrap().len(), input.len());
        }
        assert!(seen_busy);
        assert!(!engine.is_processing());
    }
}
