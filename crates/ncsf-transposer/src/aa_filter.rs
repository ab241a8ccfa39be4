//! Anti-alias low-pass filter
//!
//! A Hamming-windowed sinc FIR whose cutoff follows the transposer rate.
//! Coefficients are normalized to sum to `2^14` and stored as `i16`, so the
//! same filter drives both the integer and the floating-point pipeline.

use crate::buffer::SampleBuffer;
use crate::error::{Result, TransposerError};
use crate::fir::{FirFilter, RESULT_SHIFT};
use crate::sample::Sample;
use std::f64::consts::PI;

/// Default number of filter taps.
pub const DEFAULT_FILTER_TAPS: usize = 32;

/// Low-pass FIR filter with a normalized cutoff in `(0, 0.5]`.
#[derive(Debug, Clone)]
pub struct AntiAliasFilter {
    cutoff: f64,
    fir: FirFilter,
}

impl AntiAliasFilter {
    /// Create a filter with `length` taps and cutoff 0.5 (pass-through band).
    pub fn new(length: usize) -> Result<Self> {
        check_length(length)?;
        Ok(Self::build(0.5, length))
    }

    fn build(cutoff: f64, length: usize) -> Self {
        let fir = FirFilter::new(design_taps(cutoff, length), RESULT_SHIFT);
        Self { cutoff, fir }
    }

    /// Normalized cutoff frequency (1.0 = sample rate).
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set the cutoff and recompute the coefficients.
    ///
    /// Values are clamped to `0.0..=0.5`.
    pub fn set_cutoff(&mut self, cutoff: f64) {
        let cutoff = cutoff.clamp(0.0, 0.5);
        if cutoff != self.cutoff {
            *self = Self::build(cutoff, self.length());
        }
    }

    /// Number of taps.
    pub fn length(&self) -> usize {
        self.fir.length()
    }

    /// Change the number of taps. Must be a non-zero multiple of 4.
    pub fn set_length(&mut self, length: usize) -> Result<()> {
        if let Err(err) = check_length(length) {
            log::warn!("rejected anti-alias filter length {length}");
            return Err(err);
        }
        if length != self.length() {
            *self = Self::build(self.cutoff, length);
        }
        Ok(())
    }

    /// Current integer coefficients (sum close to 16384).
    pub fn coefficients(&self) -> &[i16] {
        self.fir.taps()
    }

    /// Filter `src` into `dst`. See [`FirFilter::evaluate`].
    pub fn evaluate<S: Sample>(&self, dst: &mut SampleBuffer<S>, src: &[S], channels: usize) -> usize {
        self.fir.evaluate(dst, src, channels)
    }
}

impl Default for AntiAliasFilter {
    fn default() -> Self {
        Self::build(0.5, DEFAULT_FILTER_TAPS)
    }
}

fn check_length(length: usize) -> Result<()> {
    if length == 0 || length % 4 != 0 {
        return Err(TransposerError::InvalidFilterLength(length));
    }
    Ok(())
}

/// Windowed-sinc design, scaled so the taps sum to `2^RESULT_SHIFT`.
fn design_taps(cutoff: f64, length: usize) -> Vec<i16> {
    let fc2 = 2.0 * cutoff;
    let wc = PI * fc2;
    let window_step = 2.0 * PI / length as f64;
    let half = (length / 2) as f64;

    let work: Vec<f64> = (0..length)
        .map(|i| {
            let cnt = i as f64 - half;
            let t = cnt * wc;
            let h = if t != 0.0 { fc2 * t.sin() / t } else { 1.0 };
            let w = 0.54 + 0.46 * (window_step * cnt).cos();
            w * h
        })
        .collect();

    let sum: f64 = work.iter().sum();
    let scale = f64::from(1u32 << RESULT_SHIFT) / sum;
    work.iter()
        .map(|&c| (c * scale).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        .collect()
}
