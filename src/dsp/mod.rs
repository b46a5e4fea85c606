//! Degradation Stages
//!
//! Leaf algorithms composed by the engine pipelines, plus the parameter
//! set, preset table and analyzer. Stage functions work in place on a
//! single channel and are generic over sample precision so the full (f64)
//! and chunk (f32) pipelines share one implementation.

pub mod aliasing;
pub mod analyzer;
pub mod mixer;
pub mod noise;
pub mod params;
pub mod preset;
pub mod quantizer;
pub mod waveshaper;

pub use analyzer::{analyze, AnalysisReport};
pub use params::ProcessingParams;
pub use preset::{all_presets, get_preset, preset_names, Preset};
