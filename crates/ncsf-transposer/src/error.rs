//! Error types for transposer configuration.

/// Errors raised when a transposer or filter is configured with values it
/// cannot honour.
///
/// Streaming itself never fails; only configuration calls return these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransposerError {
    /// Channel count outside {1, 2}
    #[error("Invalid channel count {0} (expected 1 or 2)")]
    InvalidChannelCount(usize),

    /// Rate that is not finite or below the smallest representable step
    #[error("Invalid rate {0} (must be finite and at least 1/65536)")]
    InvalidRate(f32),

    /// FIR length that is zero or not a multiple of 4
    #[error("Invalid filter length {0} (must be a non-zero multiple of 4)")]
    InvalidFilterLength(usize),
}

/// Result type for transposer operations
pub type Result<T> = std::result::Result<T, TransposerError>;
