//! Preset Table
//!
//! Named, immutable parameter sets. Pure lookup; presets never touch
//! engine state.

use crate::dsp::params::ProcessingParams;
use serde::Serialize;

/// A named parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub params: ProcessingParams,
}

const fn preset(
    name: &'static str,
    bit_depth: u32,
    downsample_factor: f64,
    mix: f64,
    waveshape: f64,
    noise: f64,
) -> Preset {
    Preset {
        name,
        params: ProcessingParams {
            bit_depth,
            downsample_factor,
            mix,
            waveshape,
            noise,
        },
    }
}

static PRESETS: [Preset; 7] = [
    preset("subtle", 12, 1.5, 0.3, 0.1, 0.0),
    preset("retro", 8, 2.0, 0.7, 0.2, 0.05),
    preset("harsh", 4, 4.0, 0.9, 0.4, 0.1),
    preset("destroy", 2, 8.0, 1.0, 0.6, 0.2),
    preset("lofi", 6, 3.0, 0.8, 0.3, 0.15),
    preset("gameboy", 4, 2.5, 1.0, 0.1, 0.05),
    preset("telephone", 3, 6.0, 1.0, 0.5, 0.1),
];

/// Look up a preset by name (ASCII case-insensitive)
pub fn get_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// All presets in display order
pub fn all_presets() -> &'static [Preset] {
    &PRESETS
}

/// Preset names in display order
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}
