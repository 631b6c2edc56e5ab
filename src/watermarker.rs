//! Public watermarking facade.

use crate::config::WatermarkConfig;
use crate::embedder;
use crate::errors::Result;
use crate::extractor::{self, ExtractOptions};
use crate::pn;
use crate::protocol::FRAME_BITS;

/// Blind DSSS audio watermarker.
///
/// Value-like: configured once, then `embed` and `extract` are pure
/// functions of their inputs. All working buffers are per-call, so one
/// instance may be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Watermarker {
    config: WatermarkConfig,
    seed: u32,
}

impl Watermarker {
    pub fn new(config: WatermarkConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.resolved_seed();
        Ok(Self { config, seed })
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Samples covered by one embedded frame: `102 * chip_rate`.
    pub fn frame_len(&self) -> usize {
        FRAME_BITS * self.config.chip_rate
    }

    /// Hide `id` (28 bits) in the first frame-length samples of `host`.
    /// Output length equals input length; samples past the frame are
    /// untouched.
    pub fn embed(&self, host: &[f32], id: u32) -> Result<Vec<f32>> {
        embedder::embed(&self.config, self.seed, host, id)
    }

    /// Recover a previously embedded ID. `Ok(None)` means no watermark was
    /// found: absence is a normal outcome, not an error.
    pub fn extract(&self, audio: &[f32]) -> Result<Option<u32>> {
        self.extract_with(audio, &ExtractOptions::default())
    }

    /// [`Self::extract`] with explicit tuning options.
    pub fn extract_with(&self, audio: &[f32], options: &ExtractOptions) -> Result<Option<u32>> {
        extractor::extract(&self.config, self.seed, audio, options)
    }

    /// The configured spreading sequence, exposed for reproducibility
    /// checks and interoperability testing.
    pub fn generate_pn(&self, length: usize) -> Vec<f32> {
        pn::generate_pn(length, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WatermarkError;

    #[test]
    fn new_validates_config() {
        let bad = WatermarkConfig {
            chip_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            Watermarker::new(bad),
            Err(WatermarkError::Config(_))
        ));
    }

    #[test]
    fn frame_len_follows_chip_rate() {
        let watermarker = Watermarker::new(WatermarkConfig {
            chip_rate: 512,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(watermarker.frame_len(), 102 * 512);
    }

    #[test]
    fn pn_accessor_matches_free_function() {
        let watermarker = Watermarker::new(WatermarkConfig {
            seed: Some(123),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            watermarker.generate_pn(256),
            crate::pn::generate_pn(256, 123)
        );
    }
}
