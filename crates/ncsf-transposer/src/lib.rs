//! # ncsf-transposer
//!
//! Sample-rate transposer used to bring the sound hardware's native rate to
//! the host output rate.
//!
//! - **Linear interpolation** with a phase carried across calls, so feeding
//!   one block or many small ones yields the same stream
//! - **Two arithmetic variants**: 16.16 fixed point and `f32`, selected once
//!   with [`Interpolation`]
//! - **Anti-alias FIR** (Hamming-windowed sinc) applied after interpolation
//!   when upsampling and before it when downsampling
//! - `i16` and `f32` samples, mono or interleaved stereo
//!
//! ## Example
//!
//! ```rust
//! use ncsf_transposer::RateTransposer;
//!
//! let mut transposer = RateTransposer::<i16>::default();
//! transposer.set_rate(32_728.5 / 44_100.0).unwrap();
//! transposer.put_samples(&[0i16; 2048]);
//!
//! let mut host = vec![0i16; 4096];
//! let frames = transposer.receive_samples(&mut host);
//! assert!(frames > 0);
//! ```

#![warn(missing_docs)]

mod aa_filter;
mod buffer;
mod error;
mod fir;
mod interpolate;
mod sample;
mod transposer;

pub use aa_filter::{AntiAliasFilter, DEFAULT_FILTER_TAPS};
pub use buffer::SampleBuffer;
pub use error::{Result, TransposerError};
pub use fir::FirFilter;
pub use interpolate::{Interpolation, LinearInterpolator};
pub use sample::{Sample, SCALE};
pub use transposer::{RateTransposer, MIN_RATE};
