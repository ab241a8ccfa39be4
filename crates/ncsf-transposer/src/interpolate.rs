//! Linear interpolation with a carried phase
//!
//! Both variants share one control flow, generic over the slope accumulator:
//! `i64` in 16.16 fixed point or `f32`. The accumulator wraps by repeated
//! subtraction, each wrap advancing the source index by one frame.

use crate::sample::{Sample, SCALE};
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, SubAssign};

/// Arithmetic used for the interpolation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// 16.16 fixed-point slope, step rounded to `rate * 65536`.
    #[default]
    FixedPoint,
    /// Single-precision floating-point slope.
    FloatingPoint,
}

trait Slope: Copy + PartialOrd + AddAssign + SubAssign {
    const ZERO: Self;
    const ONE: Self;

    fn lerp<S: Sample>(self, a: S, b: S) -> S;
}

impl Slope for i64 {
    const ZERO: Self = 0;
    const ONE: Self = SCALE;

    #[inline]
    fn lerp<S: Sample>(self, a: S, b: S) -> S {
        S::lerp_fixed(a, b, self)
    }
}

impl Slope for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn lerp<S: Sample>(self, a: S, b: S) -> S {
        S::lerp_float(a, b, self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Fixed { slope: i64, step: i64 },
    Float { slope: f32, step: f32 },
}

/// Per-stream interpolation state: phase and the last frame of the previous call.
#[derive(Debug, Clone)]
pub struct LinearInterpolator<S> {
    prev: [S; 2],
    phase: Phase,
}

impl<S: Sample> LinearInterpolator<S> {
    /// Interpolator at rate 1.0 with zeroed registers.
    pub fn new(kind: Interpolation) -> Self {
        let phase = match kind {
            Interpolation::FixedPoint => Phase::Fixed {
                slope: 0,
                step: SCALE,
            },
            Interpolation::FloatingPoint => Phase::Float {
                slope: 0.0,
                step: 1.0,
            },
        };
        Self {
            prev: [S::EQUILIBRIUM; 2],
            phase,
        }
    }

    /// Arithmetic variant chosen at construction.
    pub fn kind(&self) -> Interpolation {
        match self.phase {
            Phase::Fixed { .. } => Interpolation::FixedPoint,
            Phase::Float { .. } => Interpolation::FloatingPoint,
        }
    }

    /// Zero the slope accumulator and the previous-frame registers.
    pub fn reset(&mut self) {
        self.prev = [S::EQUILIBRIUM; 2];
        match &mut self.phase {
            Phase::Fixed { slope, .. } => *slope = i64::ZERO,
            Phase::Float { slope, .. } => *slope = f32::ZERO,
        }
    }

    /// Set the input-frames-per-output-frame step. `rate` must be positive.
    pub fn set_rate(&mut self, rate: f32) {
        match &mut self.phase {
            Phase::Fixed { step, .. } => {
                *step = ((f64::from(rate) * SCALE as f64 + 0.5) as i64).max(1);
            }
            Phase::Float { step, .. } => *step = rate,
        }
    }

    /// Interpolate the interleaved frames of `src`, appending to `out`.
    ///
    /// Returns the number of frames produced. `channels` is 1 or 2.
    pub fn transpose(&mut self, out: &mut Vec<S>, src: &[S], channels: usize) -> usize {
        let channels = channels.clamp(1, 2);
        match &mut self.phase {
            Phase::Fixed { slope, step } => {
                run(slope, *step, &mut self.prev, out, src, channels)
            }
            Phase::Float { slope, step } => {
                run(slope, *step, &mut self.prev, out, src, channels)
            }
        }
    }
}

fn run<S: Sample, T: Slope>(
    slope: &mut T,
    step: T,
    prev: &mut [S; 2],
    out: &mut Vec<S>,
    src: &[S],
    channels: usize,
) -> usize {
    let frames = src.len() / channels;
    if frames == 0 {
        return 0;
    }
    let mut produced = 0;

    // Bridge from the previous call's last frame to src[0]
    while *slope <= T::ONE {
        for ch in 0..channels {
            out.push(slope.lerp(prev[ch], src[ch]));
        }
        produced += 1;
        *slope += step;
    }
    *slope -= T::ONE;

    if frames > 1 {
        let mut used = 0;
        'frames: loop {
            while *slope > T::ONE {
                *slope -= T::ONE;
                used += 1;
                if used >= frames - 1 {
                    break 'frames;
                }
            }
            let at = used * channels;
            for ch in 0..channels {
                out.push(slope.lerp(src[at + ch], src[at + channels + ch]));
            }
            produced += 1;
            *slope += step;
        }
    }

    let last = (frames - 1) * channels;
    prev[..channels].copy_from_slice(&src[last..last + channels]);
    produced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_rate_prepends_one_silent_frame() {
        for kind in [Interpolation::FixedPoint, Interpolation::FloatingPoint] {
            let mut interp = LinearInterpolator::<i16>::new(kind);
            let mut out = Vec::new();
            assert_eq!(interp.transpose(&mut out, &[10, 20, 30], 1), 4);
            assert_eq!(out, vec![0, 10, 20, 30]);

            out.clear();
            assert_eq!(interp.transpose(&mut out, &[40, 50], 1), 2);
            assert_eq!(out, vec![40, 50]);
        }
    }

    #[test]
    fn test_half_rate_doubles_frames() {
        let mut interp = LinearInterpolator::<i16>::new(Interpolation::FixedPoint);
        interp.set_rate(0.5);
        let mut out = Vec::new();
        interp.transpose(&mut out, &[100, 200, 300], 1);
        assert_eq!(out, vec![0, 50, 100, 150, 200, 250, 300]);
    }

    #[test]
    fn test_empty_input_keeps_state() {
        let mut interp = LinearInterpolator::<f32>::new(Interpolation::FloatingPoint);
        interp.set_rate(0.75);
        let mut out = Vec::new();
        interp.transpose(&mut out, &[1.0, 2.0], 1);
        let before = (interp.prev, interp.phase);
        assert_eq!(interp.transpose(&mut out, &[], 1), 0);
        assert_eq!((interp.prev, interp.phase), before);
    }

    #[test]
    fn test_single_frame_input() {
        let mut interp = LinearInterpolator::<i16>::new(Interpolation::FixedPoint);
        interp.set_rate(2.0);
        let mut out = Vec::new();
        assert_eq!(interp.transpose(&mut out, &[8, -8], 2), 1);
        assert_eq!(out, vec![0, 0]);
        assert_eq!(interp.prev, [8, -8]);
    }

    #[test]
    fn test_reset_clears_registers() {
        let mut interp = LinearInterpolator::<i16>::new(Interpolation::FixedPoint);
        let mut out = Vec::new();
        interp.transpose(&mut out, &[5, 6, 7, 8], 2);
        interp.reset();
        assert_eq!(interp.prev, [0, 0]);
        assert_eq!(interp.kind(), Interpolation::FixedPoint);
        out.clear();
        interp.transpose(&mut out, &[1, 1], 2);
        assert_eq!(out, vec![0, 0, 1, 1]);
    }
}
