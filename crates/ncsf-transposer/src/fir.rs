//! Integer-coefficient FIR filter over interleaved frames.

use crate::buffer::SampleBuffer;
use crate::sample::Sample;

/// Coefficient scale is `2^RESULT_SHIFT`.
pub(crate) const RESULT_SHIFT: u32 = 14;

/// FIR filter with `i16` taps scaled by `2^shift`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirFilter {
    taps: Vec<i16>,
    shift: u32,
}

impl FirFilter {
    /// Build a filter from pre-scaled taps.
    pub fn new(taps: Vec<i16>, shift: u32) -> Self {
        Self { taps, shift }
    }

    /// Number of taps.
    pub fn length(&self) -> usize {
        self.taps.len()
    }

    /// Filter coefficients.
    pub fn taps(&self) -> &[i16] {
        &self.taps
    }

    /// Filter the interleaved frames in `src` and append the result to `dst`.
    ///
    /// Produces `frames - length` frames when `src` holds at least `length`
    /// frames, otherwise nothing. Output frame `j` covers input frames
    /// `j..j + length`, so the caller consumes the same count from its input.
    pub fn evaluate<S: Sample>(&self, dst: &mut SampleBuffer<S>, src: &[S], channels: usize) -> usize {
        let channels = channels.max(1);
        let length = self.taps.len();
        let frames = src.len() / channels;
        if length == 0 || frames < length {
            return 0;
        }
        let count = frames - length;

        dst.append_with(count, |out| {
            for j in 0..count {
                let base = j * channels;
                for ch in 0..channels {
                    out.push(S::convolve(
                        &self.taps,
                        self.shift,
                        &src[base + ch..],
                        channels,
                    ));
                }
            }
        })
    }
}
