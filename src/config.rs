//! Configuration types for the watermarking pipeline.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::ConfigError;
use crate::signal_processing::filters::TELECOM_HIGH_HZ;

/// Public default seed, used when neither `seed` nor `key` is provided.
pub const DEFAULT_SEED: u32 = 42;

/// Shared embedder/extractor configuration.
///
/// Interoperability requires both ends to agree on every field here plus
/// the constants in [`crate::protocol`]; a mismatched seed or chip rate
/// simply yields no watermark at the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Explicit spreading seed. Overrides `key` when set.
    pub seed: Option<u32>,
    /// Secret key string; SHA-256 hashed, first 4 bytes big-endian become
    /// the spreading seed.
    pub key: Option<String>,
    /// PN chips per frame bit. 256 keeps latency low; 512 is robust.
    pub chip_rate: usize,
    pub sample_rate: usize,
    /// Band-limit the watermark to 500-3000 Hz and raise the masking level
    /// so it survives telephony-grade channels.
    pub telecom_mode: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            seed: None,
            key: None,
            chip_rate: 256,
            sample_rate: 44_100,
            telecom_mode: false,
        }
    }
}

impl WatermarkConfig {
    /// Resolve the spreading seed: explicit seed, then key digest, then the
    /// public default.
    pub fn resolved_seed(&self) -> u32 {
        if let Some(seed) = self.seed {
            return seed;
        }
        match &self.key {
            Some(key) => seed_from_key(key),
            None => DEFAULT_SEED,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.chip_rate == 0 {
            return Err(ConfigError::InvalidChipRate {
                rate: self.chip_rate,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.telecom_mode {
            let nyquist = self.sample_rate as f64 / 2.0;
            if TELECOM_HIGH_HZ >= nyquist {
                return Err(ConfigError::NyquistViolation {
                    band_edge_hz: TELECOM_HIGH_HZ,
                    min_required_hz: TELECOM_HIGH_HZ * 2.0,
                    actual_hz: self.sample_rate,
                });
            }
        }
        Ok(())
    }
}

/// Derive a 32-bit seed from a key string: first 4 bytes of SHA-256,
/// interpreted big-endian.
pub fn seed_from_key(key: &str) -> u32 {
    let digest = Sha256::digest(key.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}
