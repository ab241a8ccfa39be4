//! Interleaved sample FIFO
//!
//! Samples are appended at the end and consumed from the front in whole
//! frames (one sample per channel). Consumed space is reclaimed lazily on the
//! next append, so reading never moves data.

use crate::sample::Sample;

/// Growable first-in first-out buffer of interleaved frames.
#[derive(Debug, Clone)]
pub struct SampleBuffer<S> {
    data: Vec<S>,
    /// Index of the first unconsumed sample in `data`
    start: usize,
    channels: usize,
}

impl<S: Sample> SampleBuffer<S> {
    /// Create an empty buffer. A channel count of 0 is treated as 1.
    pub fn new(channels: usize) -> Self {
        Self {
            data: Vec::new(),
            start: 0,
            channels: channels.max(1),
        }
    }

    /// Number of interleaved channels per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Change the frame width. Pending samples are reinterpreted, not converted.
    pub fn set_channels(&mut self, channels: usize) {
        self.channels = channels.max(1);
    }

    /// Number of whole frames waiting to be consumed.
    pub fn num_frames(&self) -> usize {
        (self.data.len() - self.start) / self.channels
    }

    /// True when no frames are pending.
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Pending samples, interleaved, oldest first.
    pub fn frames(&self) -> &[S] {
        let end = self.start + self.num_frames() * self.channels;
        &self.data[self.start..end]
    }

    /// Random access to the pending frame at `index` (0 = oldest).
    pub fn frame(&self, index: usize) -> Option<&[S]> {
        if index >= self.num_frames() {
            return None;
        }
        let at = self.start + index * self.channels;
        Some(&self.data[at..at + self.channels])
    }

    /// Append interleaved samples. A trailing partial frame is ignored.
    pub fn put_samples(&mut self, samples: &[S]) {
        let whole = samples.len() / self.channels * self.channels;
        self.compact();
        self.data.extend_from_slice(&samples[..whole]);
    }

    /// Let `fill` push samples onto the end of the buffer.
    ///
    /// `frames_hint` only sizes the reservation. Returns the number of whole
    /// frames appended; a trailing partial frame is dropped.
    pub(crate) fn append_with<F>(&mut self, frames_hint: usize, fill: F) -> usize
    where
        F: FnOnce(&mut Vec<S>),
    {
        self.compact();
        self.data.reserve(frames_hint * self.channels);
        let before = self.data.len();
        fill(&mut self.data);
        let frames = (self.data.len() - before) / self.channels;
        self.data.truncate(before + frames * self.channels);
        frames
    }

    /// Copy up to `out.len() / channels` frames into `out` and consume them.
    ///
    /// Returns the number of frames copied.
    pub fn receive_samples(&mut self, out: &mut [S]) -> usize {
        let frames = (out.len() / self.channels).min(self.num_frames());
        let len = frames * self.channels;
        out[..len].copy_from_slice(&self.data[self.start..self.start + len]);
        self.start += len;
        frames
    }

    /// Drop up to `frames` frames from the front. Returns how many were dropped.
    pub fn discard_frames(&mut self, frames: usize) -> usize {
        let frames = frames.min(self.num_frames());
        self.start += frames * self.channels;
        frames
    }

    /// Move every pending frame of `other` to the end of this buffer.
    pub fn move_from(&mut self, other: &mut SampleBuffer<S>) {
        self.put_samples(other.frames());
        other.clear();
    }

    /// Drop all pending frames.
    pub fn clear(&mut self) {
        self.data.clear();
        self.start = 0;
    }

    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        if self.start >= self.data.len() {
            self.clear();
        } else if self.start >= self.data.len() / 2 {
            self.data.drain(..self.start);
            self.start = 0;
        }
    }
}

impl<S: Sample> Default for SampleBuffer<S> {
    fn default() -> Self {
        Self::new(2)
    }
}
