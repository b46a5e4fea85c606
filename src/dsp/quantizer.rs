//! Bit Depth Quantizer
//!
//! Reduces effective bit depth by snapping samples onto `2^bits` evenly
//! spaced levels across [-1, 1], producing the stair-step distortion.

use num_traits::Float;

/// Lowest supported bit depth
pub const MIN_BIT_DEPTH: u32 = 1;

/// Bit depth treated as "no crushing"
pub const MAX_BIT_DEPTH: u32 = 16;

/// Returns true when the quantizer leaves the signal untouched
#[inline]
pub fn is_bypass(bit_depth: u32) -> bool {
    bit_depth >= MAX_BIT_DEPTH
}

/// Quantize a single sample to `max_val + 1` levels
#[inline]
fn quantize_sample<T: Float>(x: T, max_val: T) -> T {
    let one = T::one();
    let two = one + one;
    let normalized = (x + one) / two;
    let quantized = (normalized * max_val).round() / max_val;
    quantized * two - one
}

/// Reduce the bit depth of a block of samples in place
///
/// `bit_depth >= 16` is a bypass. Values below 1 are treated as 1.
pub fn reduce_bit_depth<T: Float>(samples: &mut [T], bit_depth: u32) {
    if is_bypass(bit_depth) {
        return;
    }

    let levels = 1_u32 << bit_depth.max(MIN_BIT_DEPTH);
    let max_val = match T::from(levels - 1) {
        Some(v) => v,
        None => return,
    };

    for sample in samples.iter_mut() {
        *sample = quantize_sample(*sample, max_val);
    }
}
