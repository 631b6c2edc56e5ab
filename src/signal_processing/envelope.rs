//! Time-domain psychoacoustic masking envelope and AGC normalization.

/// RMS window length in samples.
pub const MASKING_WINDOW: usize = 1024;
/// Watermark level relative to the local host RMS. Empirical defaults: the
/// telecom value is louder so the mark survives codec and band-limit loss.
pub const MASKING_DB_STANDARD: f64 = -25.0;
pub const MASKING_DB_TELECOM: f64 = -15.0;

const ENVELOPE_FLOOR: f64 = 1e-9;

/// Local RMS envelope of the host, scaled down to the masking level.
///
/// `env[n] = sqrt(movavg(x^2, 1024))`, centered (`same` alignment), floored,
/// then scaled by `10^(dB/20)`. Multiplying the shaped watermark by this
/// envelope keeps the local signal-to-watermark ratio at or above |dB|.
pub fn masking_envelope(host: &[f32], telecom_mode: bool) -> Vec<f32> {
    let db = if telecom_mode {
        MASKING_DB_TELECOM
    } else {
        MASKING_DB_STANDARD
    };
    let scale = 10f64.powf(db / 20.0);

    let n = host.len();
    let mut prefix = vec![0.0f64; n + 1];
    for (i, &x) in host.iter().enumerate() {
        let x = f64::from(x);
        prefix[i + 1] = prefix[i] + x * x;
    }

    let half = MASKING_WINDOW / 2;
    (0..n)
        .map(|i| {
            // Window [i - half, i + half), zero-padded at the edges.
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n);
            let mean = (prefix[hi] - prefix[lo]) / MASKING_WINDOW as f64;
            (mean.sqrt().max(ENVELOPE_FLOOR) * scale) as f32
        })
        .collect()
}

/// Z-score normalization: zero mean, unit variance. Applied at extraction
/// to defeat operator AGC.
pub fn zscore_normalize(input: &[f32]) -> Vec<f32> {
    if input.is_empty() {
        return Vec::new();
    }
    let n = input.len() as f64;
    let mean = input.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let variance = input
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    if std < 1e-9 {
        input.iter().map(|&x| (f64::from(x) - mean) as f32).collect()
    } else {
        input
            .iter()
            .map(|&x| ((f64::from(x) - mean) / std) as f32)
            .collect()
    }
}
