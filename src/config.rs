//! Session and audio configuration
//!
//! Plain serde structs with builder-style setters. Every field has a default,
//! so a JSON document only needs the keys it changes.

use crate::{NcsfError, Result};
use ncsf_transposer::{Interpolation, DEFAULT_FILTER_TAPS, MIN_RATE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Native mixer rate of the sound hardware (33.513982 MHz / 1024).
pub const DS_MIXER_RATE: f64 = 33_513_982.0 / 1024.0;

/// Default host output rate (44.1 kHz)
pub const DEFAULT_OUTPUT_RATE: u32 = 44_100;

/// Default number of synthesizer frames pulled per block
pub const DEFAULT_BLOCK_FRAMES: usize = 512;

/// Audio pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Rate the synthesizer produces samples at, in Hz
    pub synth_rate: f64,

    /// Host output rate in Hz
    pub output_rate: u32,

    /// Number of interleaved channels (1 or 2)
    pub channels: usize,

    /// Interpolation arithmetic
    pub interpolation: Interpolation,

    /// Run the anti-alias filter
    pub anti_alias_filter: bool,

    /// Anti-alias filter length (non-zero multiple of 4)
    pub filter_taps: usize,

    /// Synthesizer frames requested per block
    pub block_frames: usize,
}

impl AudioConfig {
    /// Configuration for `output_rate` with every other field at its default.
    pub fn new(output_rate: u32) -> Self {
        Self {
            output_rate,
            ..Self::default()
        }
    }

    /// Set the synthesizer rate.
    pub fn with_synth_rate(mut self, synth_rate: f64) -> Self {
        self.synth_rate = synth_rate;
        self
    }

    /// Set the output rate.
    pub fn with_output_rate(mut self, output_rate: u32) -> Self {
        self.output_rate = output_rate;
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Set the interpolation arithmetic.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Enable or disable the anti-alias filter.
    pub fn with_anti_alias_filter(mut self, enabled: bool) -> Self {
        self.anti_alias_filter = enabled;
        self
    }

    /// Set the anti-alias filter length.
    pub fn with_filter_taps(mut self, taps: usize) -> Self {
        self.filter_taps = taps;
        self
    }

    /// Set the block size.
    pub fn with_block_frames(mut self, frames: usize) -> Self {
        self.block_frames = frames;
        self
    }

    /// Transposer rate: synthesizer frames consumed per output frame.
    pub fn rate(&self) -> f32 {
        (self.synth_rate / f64::from(self.output_rate)) as f32
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        if !self.synth_rate.is_finite() || self.synth_rate <= 0.0 {
            return Err(config_error(format!(
                "synth_rate must be a positive number, got {}",
                self.synth_rate
            )));
        }
        if self.output_rate == 0 {
            return Err(config_error("output_rate must be greater than zero".into()));
        }
        let rate = self.rate();
        if !rate.is_finite() || rate < MIN_RATE {
            return Err(config_error(format!(
                "synth_rate / output_rate must be a finite ratio of at least {MIN_RATE}, got {rate}"
            )));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(config_error(format!(
                "channels must be 1 or 2, got {}",
                self.channels
            )));
        }
        if self.filter_taps == 0 || self.filter_taps % 4 != 0 {
            return Err(config_error(format!(
                "filter_taps must be a non-zero multiple of 4, got {}",
                self.filter_taps
            )));
        }
        if self.block_frames == 0 {
            return Err(config_error("block_frames must be greater than zero".into()));
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            synth_rate: DS_MIXER_RATE,
            output_rate: DEFAULT_OUTPUT_RATE,
            channels: 2,
            interpolation: Interpolation::default(),
            anti_alias_filter: true,
            filter_taps: DEFAULT_FILTER_TAPS,
            block_frames: DEFAULT_BLOCK_FRAMES,
        }
    }
}

/// Top-level session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Audio pipeline
    pub audio: AudioConfig,
}

impl SessionConfig {
    /// Set the audio configuration.
    pub fn with_audio(mut self, audio: AudioConfig) -> Self {
        self.audio = audio;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.audio.validate()
    }
}

fn config_error(msg: String) -> NcsfError {
    log::warn!("rejected configuration: {msg}");
    NcsfError::ConfigError(msg)
}
