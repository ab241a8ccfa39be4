//! Sample formats accepted by the transposer.

use crate::Interpolation;
use std::fmt::Debug;

/// Fixed-point interpolation scale (16.16).
pub const SCALE: i64 = 65_536;

/// A PCM sample the transposer can interpolate and filter.
///
/// Implemented for `i16` (integer pipeline, saturating) and `f32`.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Silence.
    const EQUILIBRIUM: Self;

    /// Interpolation variant that suits this sample format best.
    const PREFERRED_INTERPOLATION: Interpolation;

    /// `((SCALE - weight) * a + weight * b) / SCALE`, with `weight` in `0..=SCALE`.
    fn lerp_fixed(a: Self, b: Self, weight: i64) -> Self;

    /// `(1 - weight) * a + weight * b`, with `weight` in `0.0..=1.0`.
    fn lerp_float(a: Self, b: Self, weight: f32) -> Self;

    /// Dot product of `taps` with every `stride`-th sample of `window`,
    /// divided by `2^shift`.
    ///
    /// `window` must hold at least `(taps.len() - 1) * stride + 1` samples.
    fn convolve(taps: &[i16], shift: u32, window: &[Self], stride: usize) -> Self;
}

impl Sample for i16 {
    const EQUILIBRIUM: Self = 0;
    const PREFERRED_INTERPOLATION: Interpolation = Interpolation::FixedPoint;

    #[inline]
    fn lerp_fixed(a: Self, b: Self, weight: i64) -> Self {
        let vol1 = SCALE - weight;
        let temp = vol1 * a as i64 + weight * b as i64;
        (temp / SCALE) as i16
    }

    #[inline]
    fn lerp_float(a: Self, b: Self, weight: f32) -> Self {
        ((1.0 - weight) * a as f32 + weight * b as f32) as i16
    }

    #[inline]
    fn convolve(taps: &[i16], shift: u32, window: &[Self], stride: usize) -> Self {
        let sum: i64 = taps
            .iter()
            .enumerate()
            .map(|(i, &tap)| tap as i64 * window[i * stride] as i64)
            .sum();
        (sum >> shift).clamp(i16::MIN as i64, i16::MAX as i64) as i16
    }
}

impl Sample for f32 {
    const EQUILIBRIUM: Self = 0.0;
    const PREFERRED_INTERPOLATION: Interpolation = Interpolation::FloatingPoint;

    #[inline]
    fn lerp_fixed(a: Self, b: Self, weight: i64) -> Self {
        ((SCALE - weight) as f32 * a + weight as f32 * b) / SCALE as f32
    }

    #[inline]
    fn lerp_float(a: Self, b: Self, weight: f32) -> Self {
        (1.0 - weight) * a + weight * b
    }

    #[inline]
    fn convolve(taps: &[i16], shift: u32, window: &[Self], stride: usize) -> Self {
        let sum: f32 = taps
            .iter()
            .enumerate()
            .map(|(i, &tap)| tap as f32 * window[i * stride])
            .sum();
        sum / (1u32 << shift) as f32
    }
}
