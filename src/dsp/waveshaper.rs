//! Waveshaper
//!
//! Fixed tanh soft-clip curve. `drive` pushes the signal harder into the
//! curve; the result is scaled back by a fixed headroom factor.

use num_traits::Float;

/// Gain added per unit of drive
const DRIVE_GAIN: f64 = 3.0;

/// Output scale after shaping
pub const HEADROOM: f64 = 0.8;

/// Returns true when the waveshaper leaves the signal untouched
#[inline]
pub fn is_bypass(drive: f64) -> bool {
    !(drive > 0.0)
}

/// Shape a single sample
#[inline]
pub fn shape_sample<T: Float>(x: T, gain: T, headroom: T) -> T {
    (x * gain).tanh() * headroom
}

/// Apply the soft-clip curve to a block of samples in place
pub fn apply_waveshaping<T: Float>(samples: &mut [T], drive: f64) {
    if is_bypass(drive) {
        return;
    }

    let (gain, headroom) = match (T::from(1.0 + drive * DRIVE_GAIN), T::from(HEADROOM)) {
        (Some(g), Some(h)) => (g, h),
        _ => return,
    };

    for sample in samples.iter_mut() {
        *sample = shape_sample(*sample, gain, headroom);
    }
}
