//! Aliasing Stage
//!
//! Simulates lossy resampling. The full pipeline resamples each channel down
//! to `len / factor` frames and back up with a band-limited Fourier resampler;
//! the down/up round trip discards the upper spectrum and reintroduces
//! aliasing. The chunk pipeline uses a cheap hold-and-repeat instead, which
//! sounds different at equal factors.

use num_traits::Float;
use rustfft::num_complex::Complex;
use rustfft::{FftNum, FftPlanner};

/// Returns true when the aliasing stage leaves the signal untouched
#[inline]
pub fn is_bypass(factor: f64) -> bool {
    !(factor > 1.0)
}

/// Number of frames the signal is squeezed into before being stretched back
///
/// Never returns less than one frame.
pub fn target_len(original_len: usize, factor: f64) -> usize {
    let target = (original_len as f64 / factor).round();
    if target.is_finite() && target >= 1.0 {
        target as usize
    } else {
        1
    }
}

/// Resample a block to `num` samples in the frequency domain
///
/// Keeps the spectrum below the smaller of the two Nyquist limits, splitting
/// or joining the Nyquist bin when the shorter length is even, then scales
/// by `num / len` so amplitudes are preserved.
pub fn resample<T: FftNum + Float>(input: &[T], num: usize) -> Vec<T> {
    resample_with(&mut FftPlanner::new(), input, num)
}

/// [`resample`] with a caller-owned planner, so repeated calls share plans
pub fn resample_with<T: FftNum + Float>(planner: &mut FftPlanner<T>, input: &[T], num: usize) -> Vec<T> {
    let nx = input.len();
    if nx == 0 || num == 0 {
        return vec![T::zero(); num];
    }
    if nx == num {
        return input.to_vec();
    }

    let mut spectrum: Vec<Complex<T>> = input.iter().map(|&x| Complex::new(x, T::zero())).collect();
    planner.plan_fft_forward(nx).process(&mut spectrum);

    // Positive half of the output spectrum, 0..=num/2
    let half_len = num / 2 + 1;
    let mut half = vec![Complex::new(T::zero(), T::zero()); half_len];

    let n = num.min(nx);
    let nyq = n / 2 + 1;
    half[..nyq].copy_from_slice(&spectrum[..nyq]);

    if n % 2 == 0 {
        let two = T::one() + T::one();
        if num < nx {
            half[n / 2] = half[n / 2] * two;
        } else {
            half[n / 2] = half[n / 2] / two;
        }
    }

    // Rebuild a Hermitian spectrum so the inverse transform is real
    let mut full = vec![Complex::new(T::zero(), T::zero()); num];
    full[0] = Complex::new(half[0].re, T::zero());
    for k in 1..=(num - 1) / 2 {
        full[k] = half[k];
        full[num - k] = half[k].conj();
    }
    if num % 2 == 0 {
        full[num / 2] = Complex::new(half[num / 2].re, T::zero());
    }

    planner.plan_fft_inverse(num).process(&mut full);

    // Unnormalized inverse FFT divides out by num; amplitude scale is num/nx
    let scale = match T::from(nx) {
        Some(v) => v,
        None => return vec![T::zero(); num],
    };
    full.into_iter().map(|c| c.re / scale).collect()
}

/// Squeeze a channel down by `factor` and stretch it back to its own length
pub fn downsample_and_upsample<T: FftNum + Float>(samples: &[T], factor: f64) -> Vec<T> {
    downsample_and_upsample_with(&mut FftPlanner::new(), samples, factor)
}

/// [`downsample_and_upsample`] with a caller-owned planner
///
/// Channels of equal length reuse the same forward and inverse plans.
pub fn downsample_and_upsample_with<T: FftNum + Float>(
    planner: &mut FftPlanner<T>,
    samples: &[T],
    factor: f64,
) -> Vec<T> {
    if is_bypass(factor) || samples.is_empty() {
        return samples.to_vec();
    }

    let original_len = samples.len();
    let down = resample_with(planner, samples, target_len(original_len, factor));
    resample_with(planner, &down, original_len)
}

/// Run length used by hold-and-repeat
#[inline]
pub fn hold_step(factor: f64) -> usize {
    let step = factor.round();
    if step.is_finite() && step >= 1.0 {
        step as usize
    } else {
        1
    }
}

/// Overwrite each run of `round(factor)` samples with its first value
pub fn hold_and_repeat<T: Float>(samples: &mut [T], factor: f64) {
    if is_bypass(factor) {
        return;
    }

    let step = hold_step(factor);
    if step <= 1 {
        return;
    }

    for run in samples.chunks_mut(step) {
        let held = run[0];
        run.fill(held);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_bypass_at_or_below_one() {
        let original = sine(440.0, 44100.0, 512);
        assert_eq!(downsample_and_upsample(&original, 1.0), original);
        assert_eq!(downsample_and_upsample(&original, 0.25), original);
        assert_eq!(downsample_and_upsample(&original, f64::NAN), original);
    }

    #[test]
    fn test_target_len() {
        assert_eq!(target_len(1000, 3.0), 333);
        assert_eq!(target_len(1000, 1.5), 667);
        assert_eq!(target_len(3, 8.0), 1);
        assert_eq!(target_len(1, 100.0), 1);
    }

    #[test]
    fn test_resample_preserves_length() {
        let original = sine(440.0, 44100.0, 1000);
        for factor in [1.5, 2.0, 3.0, 8.0, 1000.0] {
            let out = downsample_and_upsample(&original, factor);
            assert_eq!(out.len(), original.len());
            assert!(out.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_low_frequency_survives_round_trip() {
        // A periodic tone well below the reduced Nyquist passes through intact
        let original = sine(4.0, 1024.0, 1024);
        let out = downsample_and_upsample(&original, 2.0);
        for (a, b) in original.iter().zip(out.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_high_frequency_removed() {
        // 300 cycles over 1024 frames sits above the Nyquist of 256 frames
        let original = sine(300.0, 1024.0, 1024);
        let out = downsample_and_upsample(&original, 4.0);
        let energy: f64 = out.iter().map(|s| s * s).sum();
        assert!(energy < 1e-12, "energy = {}", energy);
    }

    #[test]
    fn test_single_frame_target_gives_mean() {
        let original = vec![0.2, 0.4, 0.6];
        let out = downsample_and_upsample(&original, 10.0);
        for s in out {
            assert_abs_diff_eq!(s, 0.4, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_sample_buffer() {
        let out = downsample_and_upsample(&[0.5_f64], 4.0);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_resample_constant_upsample() {
        let out = resample(&[0.25_f64, 0.25, 0.25, 0.25], 10);
        assert_eq!(out.len(), 10);
        for s in out {
            assert_abs_diff_eq!(s, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shared_planner_matches_fresh_planner() {
        let original = sine(37.0, 1000.0, 1000);
        let mut planner = FftPlanner::new();
        for num in [333, 1000, 2500, 333] {
            let shared = resample_with(&mut planner, &original, num);
            assert_eq!(shared, resample(&original, num));
        }
    }

    #[test]
    fn test_hold_and_repeat() {
        let mut samples = vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        hold_and_repeat(&mut samples, 3.0);
        assert_eq!(samples, vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0, 7.0]);
    }

    #[test]
    fn test_hold_step_rounds() {
        assert_eq!(hold_step(2.5), 3);
        assert_eq!(hold_step(1.4), 1);
        assert_eq!(hold_step(6.0), 6);

        // factor 1.4 rounds to a step of one, leaving the block untouched
        let mut samples = vec![0.1_f32, 0.2, 0.3];
        hold_and_repeat(&mut samples, 1.4);
        assert_eq!(samples, vec![0.1, 0.2, 0.3]);
    }
}
