//! Noise Injector
//!
//! Adds zero-mean Gaussian noise. Values are drawn fresh for every sample
//! on every call, so output is non-deterministic unless the generator is
//! seeded; tests assert statistical properties only.

use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

/// Standard deviation per unit of `amount` on the full pipeline
pub const FULL_NOISE_SCALE: f64 = 0.1;

/// Standard deviation per unit of `amount` on the chunk pipeline
pub const CHUNK_NOISE_SCALE: f64 = 0.05;

/// Returns true when the injector leaves the signal untouched
#[inline]
pub fn is_bypass(amount: f64) -> bool {
    !(amount > 0.0)
}

/// Add Gaussian noise with standard deviation `amount * scale` in place
pub fn add_noise<T, R>(samples: &mut [T], amount: f64, scale: f64, rng: &mut R)
where
    T: Float,
    StandardNormal: Distribution<T>,
    R: Rng + ?Sized,
{
    if is_bypass(amount) {
        return;
    }

    let std_dev = match T::from(amount * scale) {
        Some(sd) => sd,
        None => return,
    };
    let normal = match Normal::new(T::zero(), std_dev) {
        Ok(n) => n,
        Err(err) => {
            tracing::warn!("noise stage skipped: {}", err);
            return;
        }
    };

    for sample in samples.iter_mut() {
        *sample = *sample + normal.sample(rng);
    }
}
