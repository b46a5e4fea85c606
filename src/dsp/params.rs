//! Processing Parameters
//!
//! The five knobs that drive the crusher pipelines. Each knob is clamped to
//! its documented range on entry to a pipeline; nothing here is ever
//! rejected by the engine itself. JSON setters are the configuration layer
//! used by front ends.

use crate::dsp::preset::get_preset;
use crate::dsp::quantizer::{MAX_BIT_DEPTH, MIN_BIT_DEPTH};
use crate::error::{CrusherError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Constants
// ============================================================================

/// Minimum downsample factor (1.0 = no aliasing)
const MIN_DOWNSAMPLE_FACTOR: f64 = 1.0;

/// Minimum for the unit-range knobs (mix, waveshape, noise)
const MIN_UNIT: f64 = 0.0;

/// Maximum for the unit-range knobs (mix, waveshape, noise)
const MAX_UNIT: f64 = 1.0;

/// Names accepted by [`ProcessingParams::set_param`]
pub const PARAM_NAMES: [&str; 5] = ["bit_depth", "downsample_factor", "mix", "waveshape", "noise"];

// ============================================================================
// Processing Parameters
// ============================================================================

/// Distortion settings for one pipeline call
///
/// # Parameters
/// - `bit_depth`: 1 to 16, 16 = bypass
/// - `downsample_factor`: >= 1.0, 1.0 = bypass
/// - `mix`: 0.0 (dry) to 1.0 (wet)
/// - `waveshape`: 0.0 (bypass) to 1.0 drive
/// - `noise`: 0.0 (bypass) to 1.0 noise amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    pub bit_depth: u32,
    pub downsample_factor: f64,
    pub mix: f64,
    pub waveshape: f64,
    pub noise: f64,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            bit_depth: 8,
            downsample_factor: 1.0,
            mix: 1.0,
            waveshape: 0.0,
            noise: 0.0,
        }
    }
}

/// Clamp a unit-range knob, mapping NaN to `fallback`
#[inline]
fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(MIN_UNIT, MAX_UNIT)
    }
}

impl ProcessingParams {
    /// Parameters with every stage bypassed and a fully wet mix
    pub fn bypass() -> Self {
        Self {
            bit_depth: MAX_BIT_DEPTH,
            downsample_factor: MIN_DOWNSAMPLE_FACTOR,
            mix: MAX_UNIT,
            waveshape: MIN_UNIT,
            noise: MIN_UNIT,
        }
    }

    /// Return a copy with every knob inside its documented range
    ///
    /// NaN knobs fall back to their bypass value (mix falls back to fully wet).
    pub fn clamped(&self) -> Self {
        let downsample_factor = if self.downsample_factor.is_nan() {
            MIN_DOWNSAMPLE_FACTOR
        } else {
            self.downsample_factor.max(MIN_DOWNSAMPLE_FACTOR)
        };

        let clamped = Self {
            bit_depth: self.bit_depth.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH),
            downsample_factor,
            mix: clamp_unit(self.mix, MAX_UNIT),
            waveshape: clamp_unit(self.waveshape, MIN_UNIT),
            noise: clamp_unit(self.noise, MIN_UNIT),
        };

        if clamped != *self && !self.has_nan() {
            tracing::warn!("parameters clamped: {:?} -> {:?}", self, clamped);
        }
        clamped
    }

    fn has_nan(&self) -> bool {
        self.downsample_factor.is_nan() || self.mix.is_nan() || self.waveshape.is_nan() || self.noise.is_nan()
    }

    /// True when every stage is at its bypass value and the mix is fully wet
    pub fn is_bypass(&self) -> bool {
        let p = self.clamped();
        p.bit_depth >= MAX_BIT_DEPTH
            && p.downsample_factor <= MIN_DOWNSAMPLE_FACTOR
            && p.mix >= MAX_UNIT
            && p.waveshape <= MIN_UNIT
            && p.noise <= MIN_UNIT
    }

    /// Replace every knob with the named preset
    ///
    /// Returns false and leaves the parameters untouched if no preset has
    /// that name.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match get_preset(name) {
            Some(preset) => {
                *self = preset.params;
                true
            }
            None => {
                tracing::debug!("unknown preset '{}', parameters unchanged", name);
                false
            }
        }
    }

    /// Set a single parameter by name from a JSON number
    pub fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        let number = value.as_f64().ok_or_else(|| CrusherError::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected number, got {}", value),
        })?;

        match name {
            "bit_depth" => {
                self.bit_depth = number.round().clamp(MIN_BIT_DEPTH as f64, MAX_BIT_DEPTH as f64) as u32;
            }
            "downsample_factor" => self.downsample_factor = number,
            "mix" => self.mix = number,
            "waveshape" => self.waveshape = number,
            "noise" => self.noise = number,
            _ => {
                return Err(CrusherError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("unknown parameter; valid names: {}", PARAM_NAMES.join(", ")),
                })
            }
        }
        Ok(())
    }

    /// Apply every recognised key of a JSON object
    ///
    /// Keys not present keep their current value.
    pub fn from_json(&mut self, json: &Value) -> Result<()> {
        let object = json.as_object().ok_or_else(|| CrusherError::InvalidParameter {
            name: "params".to_string(),
            reason: format!("expected object, got {}", json),
        })?;

        for (name, value) in object {
            self.set_param(name, value)?;
        }
        Ok(())
    }

    /// Serialize parameters to JSON
    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(CrusherError::Serialization)
    }
}
