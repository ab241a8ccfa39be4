//! Host-rate audio rendering
//!
//! [`AudioRenderer`] sits between the synthesizer and the host: it pulls
//! blocks at the synthesizer rate, pushes them through a [`RateTransposer`]
//! and hands out frames at the output rate. Once the source runs dry the
//! transposer's store buffer is flushed so the tail is not lost.

use crate::config::AudioConfig;
use crate::Result;
use ncsf_transposer::{RateTransposer, Sample};

/// Producer of interleaved frames at the synthesizer rate.
pub trait SampleSource<S> {
    /// Fill `buffer` with interleaved frames and return how many were written.
    ///
    /// Returning fewer frames than fit in `buffer` marks the end of input.
    fn generate_samples_into(&mut self, buffer: &mut [S]) -> usize;
}

impl<S, F> SampleSource<S> for F
where
    F: FnMut(&mut [S]) -> usize,
{
    fn generate_samples_into(&mut self, buffer: &mut [S]) -> usize {
        self(buffer)
    }
}

/// Pull-driven resampling pipeline from a [`SampleSource`] to the host.
pub struct AudioRenderer<S: Sample, Src> {
    source: Src,
    transposer: RateTransposer<S>,
    block: Vec<S>,
    block_frames: usize,
    channels: usize,
    source_done: bool,
    flushed: bool,
}

impl<S: Sample, Src: SampleSource<S>> AudioRenderer<S, Src> {
    /// Build a renderer for `config` around `source`.
    pub fn new(config: &AudioConfig, source: Src) -> Result<Self> {
        config.validate()?;

        let mut transposer = RateTransposer::new(config.interpolation);
        transposer.set_channels(config.channels)?;
        transposer.aa_filter_mut().set_length(config.filter_taps)?;
        transposer.enable_aa_filter(config.anti_alias_filter);
        transposer.set_rate(config.rate())?;

        log::debug!(
            "audio renderer: {:.1} Hz -> {} Hz, {} channel(s), {:?}, filter {}",
            config.synth_rate,
            config.output_rate,
            config.channels,
            config.interpolation,
            if config.anti_alias_filter { "on" } else { "off" }
        );

        Ok(Self {
            source,
            transposer,
            block: vec![S::EQUILIBRIUM; config.block_frames * config.channels],
            block_frames: config.block_frames,
            channels: config.channels,
            source_done: false,
            flushed: false,
        })
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The transposer.
    pub fn transposer(&self) -> &RateTransposer<S> {
        &self.transposer
    }

    /// The source.
    pub fn source(&self) -> &Src {
        &self.source
    }

    /// Mutable access to the source.
    pub fn source_mut(&mut self) -> &mut Src {
        &mut self.source
    }

    /// Consume the renderer and return its source.
    pub fn into_source(self) -> Src {
        self.source
    }

    /// True once the source has ended and every buffered frame was handed out.
    pub fn is_finished(&self) -> bool {
        self.source_done && self.flushed && self.transposer.is_empty()
    }

    /// Fill `out` with host-rate frames. Returns the number of frames written;
    /// fewer than requested only at the end of the stream.
    pub fn fill(&mut self, out: &mut [S]) -> usize {
        let channels = self.channels;
        let wanted = out.len() / channels;
        let mut written = 0;

        while written < wanted {
            if self.transposer.num_samples() == 0 {
                if !self.pull() {
                    break;
                }
                continue;
            }
            written += self
                .transposer
                .receive_samples(&mut out[written * channels..wanted * channels]);
        }
        written
    }

    /// Render `frames` frames into a new vector (shorter at end of stream).
    pub fn render(&mut self, frames: usize) -> Vec<S> {
        let mut out = vec![S::EQUILIBRIUM; frames * self.channels];
        let written = self.fill(&mut out);
        out.truncate(written * self.channels);
        out
    }

    /// Feed the transposer one more step. Returns false when nothing is left.
    fn pull(&mut self) -> bool {
        if !self.source_done {
            let frames = self
                .source
                .generate_samples_into(&mut self.block)
                .min(self.block_frames);
            self.transposer.put_samples(&self.block[..frames * self.channels]);
            if frames < self.block_frames {
                log::debug!("audio source ended after a {frames}-frame block");
                self.source_done = true;
            }
            return true;
        }
        if !self.flushed {
            self.transposer.flush_store_buffer();
            self.flushed = true;
            return true;
        }
        false
    }
}
