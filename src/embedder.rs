//! Watermark embedding: frame assembly, spreading, shaping, masking,
//! injection.

use tracing::trace;

use crate::config::WatermarkConfig;
use crate::errors::{Result, WatermarkError};
use crate::pn::generate_pn;
use crate::protocol::{self, FRAME_BITS};
use crate::signal_processing::{masking_envelope, shape_spectrum, BandpassFilter};

/// Expand frame bits to antipodal chips and multiply element-wise by the PN
/// stream. `pn` must hold exactly `bits.len() * chip_rate` chips.
pub(crate) fn spread_bits(bits: &[u8], pn: &[f32], chip_rate: usize) -> Vec<f32> {
    debug_assert_eq!(pn.len(), bits.len() * chip_rate);
    let mut signal = Vec::with_capacity(pn.len());
    for (i, &bit) in bits.iter().enumerate() {
        let symbol = if bit != 0 { 1.0f32 } else { -1.0 };
        for &chip in &pn[i * chip_rate..(i + 1) * chip_rate] {
            signal.push(symbol * chip);
        }
    }
    signal
}

/// Embed `id` into the first frame-length samples of `host`; the remainder
/// of the host passes through untouched.
pub(crate) fn embed(
    config: &WatermarkConfig,
    seed: u32,
    host: &[f32],
    id: u32,
) -> Result<Vec<f32>> {
    let frame_bits = protocol::build_frame(id)?;
    let frame_len = FRAME_BITS * config.chip_rate;
    if host.len() < frame_len {
        return Err(WatermarkError::HostTooShort {
            needed: frame_len,
            got: host.len(),
        });
    }

    let pn = generate_pn(frame_len, seed);
    let mut spread = spread_bits(&frame_bits, &pn, config.chip_rate);
    if config.telecom_mode {
        spread = BandpassFilter::telecom(config.sample_rate).filter(&spread);
    }

    let prefix = &host[..frame_len];
    let mut shaped = shape_spectrum(&spread, prefix);
    normalize_variance(&mut shaped);

    let envelope = masking_envelope(prefix, config.telecom_mode);
    let mut output = host.to_vec();
    for i in 0..frame_len {
        output[i] += shaped[i] * envelope[i];
    }
    trace!(id, frame_len, "embedded watermark frame");
    Ok(output)
}

/// Rescale to unit standard deviation so spectral shaping cannot change the
/// injected watermark level.
fn normalize_variance(signal: &mut [f32]) {
    if signal.is_empty() {
        return;
    }
    let n = signal.len() as f64;
    let mean = signal.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let variance = signal
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    if std > 1e-9 {
        for x in signal.iter_mut() {
            *x = (f64::from(*x) / std) as f32;
        }
    }
}
