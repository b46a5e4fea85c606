//! CLI Command Implementations

use log::{info, warn};
use serde::Serialize;

use crate::dsp::{all_presets, analyze, AnalysisReport, ProcessingParams};
use crate::engine::{generate_sine, AudioBuffer, CrusherEngine};
use crate::error::{CrusherError, Result};

/// Settings for the `demo` command
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub preset: Option<String>,
    pub params: Option<String>,
    pub frequency: f32,
    pub duration: f32,
    pub sample_rate: u32,
    pub channels: usize,
    pub chunk: Option<usize>,
    pub seed: Option<u64>,
}

/// Output of the `demo` command
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub params: ProcessingParams,
    pub pipeline: &'static str,
    pub input: AnalysisReport,
    pub output: AnalysisReport,
}

/// Print the preset table.
pub fn list_presets() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(all_presets())?);
    Ok(())
}

/// Resolve preset and JSON overrides into one parameter set
pub fn resolve_params(preset: Option<&str>, overrides: Option<&str>) -> Result<ProcessingParams> {
    let mut params = ProcessingParams::default();

    if let Some(name) = preset {
        if !params.apply_preset(name) {
            warn!("Unknown preset '{}', keeping current parameters", name);
        }
    }

    if let Some(json) = overrides {
        let value: serde_json::Value = serde_json::from_str(json)?;
        params.from_json(&value)?;
    }

    Ok(params)
}

/// Run a buffer through the chunk pipeline block by block
pub fn process_in_chunks(
    engine: &mut CrusherEngine,
    buffer: &AudioBuffer,
    params: &ProcessingParams,
    chunk_frames: usize,
) -> Result<AudioBuffer> {
    if chunk_frames == 0 {
        return Err(CrusherError::InvalidInput {
            reason: "chunk size must be at least one frame".to_string(),
        });
    }

    let mut output = AudioBuffer::new(0, buffer.channels(), buffer.sample_rate);
    let mut start = 0;
    while start < buffer.len() {
        let end = (start + chunk_frames).min(buffer.len());
        let block = AudioBuffer::from_planar(
            buffer.samples.iter().map(|ch| ch[start..end].to_vec()).collect(),
            buffer.sample_rate,
        )?;

        let processed = engine.process_chunk(&block, params)?;
        for (out, ch) in output.samples.iter_mut().zip(processed.samples) {
            out.extend(ch);
        }
        start = end;
    }

    Ok(output)
}

/// Crush a synthesized tone and report before/after metrics.
pub fn demo(options: &DemoOptions) -> Result<DemoReport> {
    let params = resolve_params(options.preset.as_deref(), options.params.as_deref())?;
    info!("Demo with parameters: {:?}", params);

    let input = generate_sine(
        options.frequency,
        0.8,
        options.duration,
        options.channels,
        options.sample_rate,
    );

    let mut engine = match options.seed {
        Some(seed) => CrusherEngine::with_seed(options.sample_rate, seed),
        None => CrusherEngine::new(options.sample_rate),
    };

    let (pipeline, output) = match options.chunk {
        Some(frames) => ("chunk", process_in_chunks(&mut engine, &input, &params, frames)?),
        None => ("full", engine.process_full(&input, &params)?),
    };

    Ok(DemoReport {
        params: params.clamped(),
        pipeline,
        input: analyze(&input),
        output: analyze(&output),
    })
}
