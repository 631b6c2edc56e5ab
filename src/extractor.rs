//! Blind extraction: pre-process, synchronize, despread, decode, verify.

use tracing::debug;

use crate::config::WatermarkConfig;
use crate::errors::Result;
use crate::pn::generate_pn;
use crate::protocol::{self, ENCODED_PAYLOAD_BITS, PREAMBLE_LEN};
use crate::signal_processing::{preemphasis, zscore_normalize, BandpassFilter};
use crate::sync;

/// Extraction tuning knobs, kept for API compatibility with earlier
/// revisions of the transceiver.
///
/// All three fields are currently accepted and ignored: the trailer-based
/// two-pass speed loop always runs, which matches the behavior the fields
/// once gated. They remain so that stored caller configurations keep
/// deserializing.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub speed_search: bool,
    pub fine_search_step: f64,
    pub fine_search_range: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            speed_search: false,
            fine_search_step: 5e-5,
            fine_search_range: 0.009,
        }
    }
}

/// Recover the embedded 28-bit ID, or `None` when no watermark survives.
pub(crate) fn extract(
    config: &WatermarkConfig,
    seed: u32,
    audio: &[f32],
    _options: &ExtractOptions,
) -> Result<Option<u32>> {
    let chip_rate = config.chip_rate;

    // Band-pass plus AGC-defeating normalization in telecom mode;
    // pre-emphasis whitening otherwise.
    let processed = if config.telecom_mode {
        let bandpass = BandpassFilter::telecom(config.sample_rate);
        zscore_normalize(&bandpass.filter(audio))
    } else {
        preemphasis(audio)
    };

    let preamble_chips = PREAMBLE_LEN * chip_rate;
    let payload_chips = ENCODED_PAYLOAD_BITS * chip_rate;
    let pn = generate_pn(preamble_chips + payload_chips, seed);

    let reference = sync::reference_preamble(&pn, chip_rate, config.telecom_mode, config.sample_rate);
    let Some(outcome) = sync::synchronize(&processed, &reference, chip_rate, config.sample_rate)
    else {
        return Ok(None);
    };

    let payload_start = outcome.start_index + preamble_chips;
    if payload_start + payload_chips > outcome.audio.len() {
        debug!("payload window extends past end of audio");
        return Ok(None);
    }
    let payload_audio = &outcome.audio[payload_start..payload_start + payload_chips];

    // The payload PN gets the same pre-processing the received audio did.
    let payload_pn = if config.telecom_mode {
        BandpassFilter::telecom(config.sample_rate).filter(&pn[preamble_chips..])
    } else {
        preemphasis(&pn[preamble_chips..])
    };

    // Despread: integrate audio x PN over each bit's chips; the correlation
    // polarity corrects channel inversion.
    let mut raw_bits = Vec::with_capacity(ENCODED_PAYLOAD_BITS);
    for bit in 0..ENCODED_PAYLOAD_BITS {
        let mut accumulator = 0.0f64;
        for i in bit * chip_rate..(bit + 1) * chip_rate {
            accumulator += f64::from(payload_audio[i]) * f64::from(payload_pn[i]);
        }
        accumulator *= f64::from(outcome.polarity);
        raw_bits.push(u8::from(accumulator > 0.0));
    }

    let id = protocol::decode_payload(&raw_bits)?;
    if id.is_none() {
        debug!("integrity check failed; reporting no watermark");
    }
    Ok(id)
}
