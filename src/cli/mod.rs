//! CLI Module
//!
//! Command-line front end for the crusher engine.

pub mod commands;

use clap::{Parser, Subcommand};

/// Crusher - bitcrusher degradation engine
#[derive(Parser, Debug)]
#[command(name = "crusher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the preset table as JSON
    #[command(name = "presets")]
    Presets,

    /// Crush a synthesized sine tone and print before/after analysis
    #[command(name = "demo")]
    Demo {
        /// Preset to start from
        #[arg(short, long)]
        preset: Option<String>,

        /// JSON object of parameter overrides, e.g. '{"bit_depth": 4}'
        #[arg(long)]
        params: Option<String>,

        /// Tone frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        frequency: f32,

        /// Tone duration in seconds
        #[arg(long, default_value_t = 1.0)]
        duration: f32,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,

        /// Number of channels
        #[arg(long, default_value_t = 2)]
        channels: usize,

        /// Use the low-latency pipeline with blocks of this many frames
        #[arg(long)]
        chunk: Option<usize>,

        /// Seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },
}
