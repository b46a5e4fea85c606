//! Crusher - Audio Degradation Engine
//!
//! Takes a buffer of audio samples and a set of distortion parameters and
//! produces a degraded copy: bit depth reduction, resampling aliasing,
//! tanh waveshaping, Gaussian noise, then a wet/dry mix and hard clip.
//!
//! # Architecture
//!
//! Two entry points on [`CrusherEngine`] share one stage order:
//! - `process_full`: whole-buffer offline/export path (f64, true resampling)
//! - `process_chunk`: low-latency playback path (f32, hold-and-repeat)

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use dsp::{AnalysisReport, ProcessingParams};
pub use engine::{AudioBuffer, CrusherEngine};
pub use error::{CrusherError, Result};
