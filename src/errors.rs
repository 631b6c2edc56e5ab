//! Watermarking error types with granular categories.
//!
//! Channel-induced failures (noise, filtering, absence of a watermark) are
//! never errors: the extractor reports them as `Ok(None)`. Errors here cover
//! caller mistakes and internal invariant violations.

use thiserror::Error;

/// Top-level error type for all watermarking operations.
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("watermark ID {id:#010x} exceeds the 28-bit capacity (top 4 bits carry the version)")]
    InvalidId { id: u32 },

    #[error("host audio too short: need {needed} samples for one frame, got {got}")]
    HostTooShort { needed: usize, got: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("FEC error: {0}")]
    Fec(#[from] FecError),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid chip rate: {rate} (must be > 0)")]
    InvalidChipRate { rate: usize },

    #[error("invalid sample rate: {rate} Hz (must be > 0)")]
    InvalidSampleRate { rate: usize },

    #[error("Nyquist violation: telecom band edge {band_edge_hz} Hz requires a sample rate > {min_required_hz} Hz, got {actual_hz} Hz")]
    NyquistViolation {
        band_edge_hz: f64,
        min_required_hz: f64,
        actual_hz: usize,
    },
}

/// FEC-layer errors. These indicate a bug in the caller, not a bad channel:
/// block lengths are fixed by the frame layout.
#[derive(Debug, Error)]
pub enum FecError {
    #[error("Hamming(7,4) encoder input length {len} is not a multiple of 4")]
    MalformedEncodeLength { len: usize },

    #[error("Hamming(7,4) decoder input length {len} is not a multiple of 7")]
    MalformedDecodeLength { len: usize },
}

/// Result type alias for watermarking operations.
pub type Result<T> = std::result::Result<T, WatermarkError>;
