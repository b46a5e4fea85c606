//! Analyzer
//!
//! Read-only diagnostics over a buffer. Independent of the pipelines; used
//! by front ends and test assertions on either input or output.

use crate::engine::buffer::AudioBuffer;
use serde::{Deserialize, Serialize};

/// Level and shape metrics for a buffer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// sqrt(mean(x^2)) over every sample
    pub rms: f64,
    /// max(|x|)
    pub peak: f64,
    /// Number of frames
    pub length: usize,
    /// max(x) - min(x)
    pub dynamic_range: f64,
    /// Sign-bit changes between consecutive samples of a channel, summed
    pub zero_crossings: usize,
}

/// Running sums shared by the flat and per-channel entry points
#[derive(Debug)]
struct Accumulator {
    count: usize,
    sum_squares: f64,
    peak: f64,
    min: f64,
    max: f64,
    zero_crossings: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            sum_squares: 0.0,
            peak: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            zero_crossings: 0,
        }
    }

    /// Feed one contiguous run; crossings are never counted across runs
    fn feed<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = f32>,
    {
        let mut prev_negative: Option<bool> = None;

        for sample in samples {
            let x = sample as f64;
            self.count += 1;
            self.sum_squares += x * x;
            self.peak = self.peak.max(x.abs());
            self.min = self.min.min(x);
            self.max = self.max.max(x);

            let negative = sample.is_sign_negative();
            if prev_negative.is_some_and(|p| p != negative) {
                self.zero_crossings += 1;
            }
            prev_negative = Some(negative);
        }
    }

    fn report(self) -> AnalysisReport {
        if self.count == 0 {
            return AnalysisReport::default();
        }

        AnalysisReport {
            rms: (self.sum_squares / self.count as f64).sqrt(),
            peak: self.peak,
            length: self.count,
            dynamic_range: self.max - self.min,
            zero_crossings: self.zero_crossings,
        }
    }
}

/// Analyze a single run of samples
///
/// An empty slice yields an all-zero report.
pub fn analyze_samples<I>(samples: I) -> AnalysisReport
where
    I: IntoIterator<Item = f32>,
{
    let mut acc = Accumulator::new();
    acc.feed(samples);
    acc.report()
}

/// Analyze a buffer
///
/// Level metrics span every sample of every channel. Zero crossings are
/// counted along time within each channel and summed. `length` is frames.
pub fn analyze(buffer: &AudioBuffer) -> AnalysisReport {
    let mut acc = Accumulator::new();
    for channel in &buffer.samples {
        acc.feed(channel.iter().copied());
    }
    let mut report = acc.report();
    report.length = buffer.len();
    report
}
