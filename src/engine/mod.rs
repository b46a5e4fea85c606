//! Audio Engine Module
//!
//! - Sample buffer type and test signals
//! - Crusher engine with the full and chunk pipelines

pub mod buffer;
pub mod crusher;

pub use buffer::{generate_sine, AudioBuffer, DEFAULT_SAMPLE_RATE};
pub use crusher::CrusherEngine;
