//! Mixer / Clipper
//!
//! Final stage of both pipelines: wet/dry blend followed by an unconditional
//! hard clip to [-1, 1].

use num_traits::Float;

/// True when [`blend`] reads the dry signal at this mix
#[inline]
pub fn needs_dry(mix: f64) -> bool {
    mix < 1.0
}

/// Blend `dry` into `wet` in place
///
/// `mix >= 1.0` leaves `wet` untouched (no blend arithmetic, no rounding
/// drift). Both slices must be the same length.
pub fn blend<T: Float>(wet: &mut [T], dry: &[T], mix: f64) {
    if !needs_dry(mix) {
        return;
    }
    debug_assert_eq!(wet.len(), dry.len());

    let (wet_gain, dry_gain) = match (T::from(mix), T::from(1.0 - mix)) {
        (Some(w), Some(d)) => (w, d),
        _ => return,
    };

    for (w, &d) in wet.iter_mut().zip(dry.iter()) {
        *w = d * dry_gain + *w * wet_gain;
    }
}

/// Hard clip every sample to [-1, 1] in place
///
/// NaN samples are replaced with silence.
pub fn clip<T: Float>(samples: &mut [T]) {
    let one = T::one();
    for sample in samples.iter_mut() {
        let x = *sample;
        *sample = if x.is_nan() { T::zero() } else { x.max(-one).min(one) };
    }
}
