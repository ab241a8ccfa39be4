//! Rate transposer
//!
//! Streams interleaved PCM through linear interpolation, optionally wrapped by
//! the anti-alias filter. When upsampling the filter runs after interpolation;
//! when downsampling it runs before. Unfiltered input carries over between
//! calls in the store buffer until the FIR has a full window.

use crate::aa_filter::AntiAliasFilter;
use crate::buffer::SampleBuffer;
use crate::error::{Result, TransposerError};
use crate::interpolate::{Interpolation, LinearInterpolator};
use crate::sample::Sample;

/// Headroom added to capacity hints on the filtered paths.
const FILTER_HINT_SLACK: usize = 16;

/// Upper bound on output frames reserved per input frame.
const MAX_HINT_RATIO: usize = 64;

/// Smallest accepted rate: one step of the 16.16 fixed-point slope.
pub const MIN_RATE: f32 = 1.0 / 65536.0;

/// Incremental sample-rate converter.
///
/// `rate` is input frames consumed per output frame: below 1.0 the stream is
/// upsampled, above 1.0 it is downsampled.
#[derive(Debug, Clone)]
pub struct RateTransposer<S: Sample> {
    rate: f32,
    channels: usize,
    interpolator: LinearInterpolator<S>,
    aa_filter: AntiAliasFilter,
    use_aa_filter: bool,
    store: SampleBuffer<S>,
    temp: SampleBuffer<S>,
    output: SampleBuffer<S>,
}

impl<S: Sample> RateTransposer<S> {
    /// Stereo transposer at rate 1.0 with the anti-alias filter enabled.
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            rate: 1.0,
            channels: 2,
            interpolator: LinearInterpolator::new(interpolation),
            aa_filter: AntiAliasFilter::default(),
            use_aa_filter: true,
            store: SampleBuffer::new(2),
            temp: SampleBuffer::new(2),
            output: SampleBuffer::new(2),
        }
    }

    /// Arithmetic variant chosen at construction.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolator.kind()
    }

    /// Current rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set the rate and retune the anti-alias cutoff.
    ///
    /// The cutoff is `0.5 / rate` when downsampling and `0.5 * rate` otherwise.
    /// Rates below [`MIN_RATE`] are rejected.
    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        if !rate.is_finite() || rate < MIN_RATE {
            log::warn!("rejected transposer rate {rate}");
            return Err(TransposerError::InvalidRate(rate));
        }
        self.rate = rate;
        self.interpolator.set_rate(rate);

        let cutoff = if rate > 1.0 {
            0.5 / f64::from(rate)
        } else {
            0.5 * f64::from(rate)
        };
        self.aa_filter.set_cutoff(cutoff);
        log::debug!("transposer rate {rate}, anti-alias cutoff {cutoff:.4}");
        Ok(())
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Switch between mono and stereo.
    ///
    /// Changing the count resets the interpolation registers; buffered samples
    /// are kept as-is.
    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        if !(1..=2).contains(&channels) {
            log::warn!("rejected channel count {channels}");
            return Err(TransposerError::InvalidChannelCount(channels));
        }
        if channels == self.channels {
            return Ok(());
        }
        self.channels = channels;
        self.store.set_channels(channels);
        self.temp.set_channels(channels);
        self.output.set_channels(channels);
        self.interpolator.reset();
        log::debug!("transposer switched to {channels} channel(s)");
        Ok(())
    }

    /// Enable or bypass the anti-alias filter.
    pub fn enable_aa_filter(&mut self, enabled: bool) {
        self.use_aa_filter = enabled;
    }

    /// Whether the anti-alias filter is in the signal path.
    pub fn is_aa_filter_enabled(&self) -> bool {
        self.use_aa_filter
    }

    /// The anti-alias filter.
    pub fn aa_filter(&self) -> &AntiAliasFilter {
        &self.aa_filter
    }

    /// Mutable access to the anti-alias filter, e.g. to change its length.
    pub fn aa_filter_mut(&mut self) -> &mut AntiAliasFilter {
        &mut self.aa_filter
    }

    /// Feed interleaved samples. A trailing partial frame is ignored.
    pub fn put_samples(&mut self, samples: &[S]) {
        let channels = self.channels;
        let frames = samples.len() / channels;
        if frames == 0 {
            return;
        }
        let samples = &samples[..frames * channels];

        if !self.use_aa_filter {
            let hint = self.output_hint(frames).saturating_add(1);
            let interpolator = &mut self.interpolator;
            self.output.append_with(hint, |out| {
                interpolator.transpose(out, samples, channels);
            });
            return;
        }

        let hint = self.output_hint(frames).saturating_add(FILTER_HINT_SLACK);
        if self.rate < 1.0 {
            // Upsampling: interpolate, then low-pass the interpolated stream
            let interpolator = &mut self.interpolator;
            self.store.append_with(hint, |out| {
                interpolator.transpose(out, samples, channels);
            });
            let filtered = self
                .aa_filter
                .evaluate(&mut self.output, self.store.frames(), channels);
            self.store.discard_frames(filtered);
        } else {
            // Downsampling: low-pass first, then interpolate
            self.store.put_samples(samples);
            self.temp.clear();
            let filtered = self
                .aa_filter
                .evaluate(&mut self.temp, self.store.frames(), channels);
            self.store.discard_frames(filtered);

            let interpolator = &mut self.interpolator;
            let temp = &self.temp;
            self.output.append_with(hint, |out| {
                interpolator.transpose(out, temp.frames(), channels);
            });
            self.temp.clear();
        }
    }

    /// Expected output frames for `frames` input frames, capped so that
    /// extreme rates cannot force a huge reservation.
    fn output_hint(&self, frames: usize) -> usize {
        ((frames as f32 / self.rate) as usize).min(frames.saturating_mul(MAX_HINT_RATIO))
    }

    /// Move samples still waiting in the store buffer straight to the output.
    ///
    /// Used once input has ended so nothing stays stranded behind the filter.
    pub fn flush_store_buffer(&mut self) {
        self.output.move_from(&mut self.store);
    }

    /// Frames ready to be read.
    pub fn num_samples(&self) -> usize {
        self.output.num_frames()
    }

    /// Copy ready frames into `out`. Returns the number of frames copied.
    pub fn receive_samples(&mut self, out: &mut [S]) -> usize {
        self.output.receive_samples(out)
    }

    /// Finished samples awaiting consumption.
    pub fn output(&self) -> &SampleBuffer<S> {
        &self.output
    }

    /// True when nothing is buffered: no ready output and no pending input.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.store.is_empty()
    }

    /// Drop buffered and ready samples. Rate, channels and filter are kept.
    pub fn clear(&mut self) {
        self.output.clear();
        self.store.clear();
    }
}

impl<S: Sample> Default for RateTransposer<S> {
    fn default() -> Self {
        Self::new(S::PREFERRED_INTERPOLATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = RateTransposer::<i16>::default();
        assert_eq!(t.rate(), 1.0);
        assert_eq!(t.channels(), 2);
        assert!(t.is_aa_filter_enabled());
        assert!(t.is_empty());
        assert_eq!(t.interpolation(), Interpolation::FixedPoint);
        assert_eq!(
            RateTransposer::<f32>::default().interpolation(),
            Interpolation::FloatingPoint
        );
    }

    #[test]
    fn test_set_rate_retunes_filter() {
        let mut t = RateTransposer::<i16>::default();
        t.set_rate(2.0).unwrap();
        assert_eq!(t.aa_filter().cutoff(), 0.25);
        t.set_rate(0.5).unwrap();
        assert_eq!(t.aa_filter().cutoff(), 0.25);
        t.set_rate(1.0).unwrap();
        assert_eq!(t.aa_filter().cutoff(), 0.5);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let mut t = RateTransposer::<f32>::default();
        assert_eq!(t.set_rate(0.0), Err(TransposerError::InvalidRate(0.0)));
        assert_eq!(t.set_rate(-1.0), Err(TransposerError::InvalidRate(-1.0)));
        assert!(t.set_rate(f32::NAN).is_err());
        assert!(t.set_rate(f32::INFINITY).is_err());
        assert_eq!(t.rate(), 1.0);
    }

    #[test]
    fn test_invalid_channels_rejected() {
        let mut t = RateTransposer::<i16>::default();
        assert_eq!(t.set_channels(0), Err(TransposerError::InvalidChannelCount(0)));
        assert_eq!(t.set_channels(3), Err(TransposerError::InvalidChannelCount(3)));
        assert_eq!(t.channels(), 2);
        t.set_channels(1).unwrap();
        assert_eq!(t.channels(), 1);
        assert_eq!(t.output().channels(), 1);
    }

    #[test]
    fn test_unfiltered_path_fills_output_directly() {
        let mut t = RateTransposer::<i16>::default();
        t.enable_aa_filter(false);
        t.put_samples(&[1, 2, 3, 4, 5]);
        // Two stereo frames in, one silent lead-in frame plus both frames out
        assert_eq!(t.num_samples(), 3);
        let mut out = [0i16; 6];
        assert_eq!(t.receive_samples(&mut out), 3);
        assert_eq!(out, [0, 0, 1, 2, 3, 4]);
        assert!(t.is_empty());
    }

    #[test]
    fn test_filtered_input_waits_in_store() {
        let mut t = RateTransposer::<i16>::default();
        t.set_channels(1).unwrap();
        t.put_samples(&[7; 10]);
        assert_eq!(t.num_samples(), 0);
        assert!(!t.is_empty());

        t.flush_store_buffer();
        assert_eq!(t.num_samples(), 10);

        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.channels(), 1);
    }
}
