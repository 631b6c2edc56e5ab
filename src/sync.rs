//! Preamble synchronization and sample-rate (speed) recovery.
//!
//! The frame carries the same 16-bit pattern at its head and tail. The head
//! correlation locates the frame and fixes polarity; the head-to-tail
//! distance against its nominal value measures speed drift, which is undone
//! by linear resampling over up to two passes.

use tracing::debug;

use crate::embedder::spread_bits;
use crate::protocol::{ENCODED_PAYLOAD_BITS, PREAMBLE_BITS, PREAMBLE_LEN};
use crate::signal_processing::{
    correlate_valid, peak, preemphasis, resample_linear, BandpassFilter,
};

/// A trailer peak must reach this fraction of the start peak before its
/// speed estimate is trusted.
const TRAILER_PEAK_RATIO: f32 = 0.1;
/// Speed offsets below this are treated as converged.
const SPEED_CONVERGENCE: f64 = 1e-4;
/// Trailer search radius around the nominal offset, per pass: wide on the
/// coarse pass, narrow once resampled.
const PASS_RADIUS: [f64; 2] = [0.10, 0.01];
/// Start re-acquisition window between passes, in samples.
const START_REFINE_RADIUS: usize = 2048;
/// Final start refinement window, in samples.
const FINAL_REFINE_RADIUS: usize = 1024;
const MAX_SPEED_PASSES: usize = 2;

pub(crate) struct SyncOutcome {
    /// Working audio, resampled to nominal speed.
    pub audio: Vec<f32>,
    /// Frame start in `audio`.
    pub start_index: usize,
    /// +1.0 or -1.0; sign of the preamble correlation peak.
    pub polarity: f32,
}

/// Build the reference preamble waveform: chip-expanded preamble bits times
/// the head of the PN stream, pre-processed exactly like the received audio
/// so the matched filter stays matched.
pub(crate) fn reference_preamble(
    pn: &[f32],
    chip_rate: usize,
    telecom_mode: bool,
    sample_rate: usize,
) -> Vec<f32> {
    let reference = spread_bits(&PREAMBLE_BITS, &pn[..PREAMBLE_LEN * chip_rate], chip_rate);
    if telecom_mode {
        BandpassFilter::telecom(sample_rate).filter(&reference)
    } else {
        preemphasis(&reference)
    }
}

fn attempt_sync(window: &[f32], reference: &[f32]) -> Option<(usize, f32)> {
    peak(&correlate_valid(window, reference))
}

/// Locate the frame in `processed` audio, estimating and undoing small
/// speed offsets via the trailer. Returns `None` when no correlation is
/// possible (input shorter than the reference).
pub(crate) fn synchronize(
    processed: &[f32],
    reference: &[f32],
    chip_rate: usize,
    sample_rate: usize,
) -> Option<SyncOutcome> {
    let preamble_chips = PREAMBLE_LEN * chip_rate;
    let search_len = 2 * preamble_chips + 2 * sample_rate;
    let window = &processed[..processed.len().min(search_len)];
    let (start_index, start_value) = attempt_sync(window, reference)?;

    let mut current = processed.to_vec();
    let mut total_speed = 1.0f64;
    let mut final_start = start_index;
    let mut polarity = if start_value > 0.0 { 1.0f32 } else { -1.0 };

    for pass in 0..MAX_SPEED_PASSES {
        let anchor = if pass == 0 {
            start_index
        } else {
            // Re-acquire the start on the resampled audio near its predicted
            // position.
            let expected = (start_index as f64 * total_speed) as usize;
            let lo = expected.saturating_sub(START_REFINE_RADIUS);
            let hi = (expected + START_REFINE_RADIUS + preamble_chips).min(current.len());
            if hi <= lo {
                break;
            }
            match attempt_sync(&current[lo..hi], reference) {
                Some((relative, value)) => {
                    final_start = lo + relative;
                    polarity = if value > 0.0 { 1.0 } else { -1.0 };
                    final_start
                }
                None => break,
            }
        };

        // The middle 50% of the reference tolerates chip-timing smear on the
        // coarse pass; later passes use the full reference for precision.
        let (template, template_offset) = if pass == 0 {
            let mid = reference.len() / 2;
            let half_width = reference.len() / 4;
            (&reference[mid - half_width..mid + half_width], mid - half_width)
        } else {
            (reference, 0)
        };

        let nominal = (PREAMBLE_LEN + ENCODED_PAYLOAD_BITS) * chip_rate;
        let expected_trailer = anchor + nominal;
        let radius = (nominal as f64 * PASS_RADIUS[pass]) as usize;
        let trailer_lo = expected_trailer.saturating_sub(radius);
        let trailer_hi = (expected_trailer + radius + preamble_chips).min(current.len());

        let mut pass_speed = 1.0f64;
        if trailer_hi > trailer_lo + template.len() {
            if let Some((relative, trailer_value)) =
                attempt_sync(&current[trailer_lo..trailer_hi], template)
            {
                if trailer_value.abs() > start_value.abs() * TRAILER_PEAK_RATIO {
                    let trailer_index =
                        (trailer_lo + relative) as i64 - template_offset as i64;
                    let actual = trailer_index - anchor as i64;
                    if actual > 0 {
                        pass_speed = nominal as f64 / actual as f64;
                        debug!(pass, speed = pass_speed, "trailer speed estimate");
                    }
                }
            }
        }

        if (pass_speed - 1.0).abs() < SPEED_CONVERGENCE {
            break;
        }

        let new_len = (current.len() as f64 * pass_speed).round() as usize;
        current = resample_linear(&current, new_len);
        total_speed *= pass_speed;
    }

    // Definitive start fix on the (possibly resampled) audio.
    let predicted = (start_index as f64 * total_speed) as usize;
    let lo = predicted.saturating_sub(FINAL_REFINE_RADIUS);
    let hi = (predicted + FINAL_REFINE_RADIUS + preamble_chips).min(current.len());
    if hi > lo {
        if let Some((relative, value)) = attempt_sync(&current[lo..hi], reference) {
            final_start = lo + relative;
            polarity = if value > 0.0 { 1.0 } else { -1.0 };
        }
    }

    Some(SyncOutcome {
        audio: current,
        start_index: final_start,
        polarity,
    })
}
