//! NCSF audio core
//!
//! The parts of a Nintendo DS emulator that sound playback depends on most:
//! the inter-processor FIFO that carries commands from the ARM9 to the ARM7
//! sound driver, and the rate transposer that brings the mixer's native rate
//! to the host output rate.
//!
//! # Features
//! - [`Session`]: owns both FIFO queues, the per-processor I/O banks, the
//!   interrupt lines and the reschedule latch, with memory-mapped dispatch
//!   for `IPCFIFOCNT`, `IPCFIFOSEND`, `IPCFIFORECV`, `IME`, `IE` and `IF`
//! - [`AudioRenderer`]: pulls synthesizer blocks from a [`SampleSource`] and
//!   hands out host-rate PCM, draining the transposer at end of input
//! - [`SessionConfig`] / [`AudioConfig`]: serde-backed configuration
//!
//! # Quick start
//! ## FIFO traffic
//! ```
//! use ncsf::{Processor, Session};
//!
//! let mut session = Session::new();
//! session.write32(Processor::Arm9, 0x0400_0188, 0xCAFE_0001);
//! assert_eq!(session.read32(Processor::Arm7, 0x0410_0000), 0xCAFE_0001);
//! ```
//!
//! ## Rendering
//! ```
//! use ncsf::{AudioConfig, AudioRenderer};
//!
//! let config = AudioConfig::default().with_channels(1);
//! let mut phase = 0u32;
//! let source = move |buf: &mut [i16]| {
//!     for s in buf.iter_mut() {
//!         phase = phase.wrapping_add(1);
//!         *s = ((phase % 64) as i16 - 32) * 256;
//!     }
//!     buf.len()
//! };
//! let mut renderer = AudioRenderer::<i16, _>::new(&config, source).unwrap();
//! let mut host = vec![0i16; 1024];
//! assert_eq!(renderer.fill(&mut host), 1024);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod io;
pub mod irq;
pub mod renderer;
pub mod session;

/// Error types for session and renderer setup
#[derive(thiserror::Error, Debug)]
pub enum NcsfError {
    /// Transposer rejected a setting
    #[error("Transposer error: {0}")]
    Transposer(#[from] ncsf_transposer::TransposerError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for NcsfError {
    fn from(err: serde_json::Error) -> Self {
        NcsfError::ConfigError(err.to_string())
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, NcsfError>;

// Public API exports
pub use config::{AudioConfig, SessionConfig, DS_MIXER_RATE};
pub use io::{IoRegisters, IO_BANK_SIZE, IO_BASE};
pub use irq::{InterruptLines, REG_IE, REG_IF, REG_IME};
pub use renderer::{AudioRenderer, SampleSource};
pub use session::{RescheduleLatch, Session, SharedSession};

pub use ncsf_ipc::{IpcFifoCnt, IpcIrq, Processor};
pub use ncsf_transposer::{Interpolation, RateTransposer, Sample};
