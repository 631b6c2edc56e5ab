//! Spectral-envelope shaping against the host (frequency-domain masking).

use rustfft::{num_complex::Complex32, FftPlanner};

/// Minimum spectral floor as a fraction of the peak. Keeps a whiteness
/// reserve on tonal hosts so the DSSS processing gain is not shaped away.
pub const SPECTRAL_FLOOR: f32 = 0.2;

/// Shape `signal` so its spectrum hides under the host's spectral envelope.
///
/// Both inputs are transformed at the next power-of-two length; the host
/// magnitude spectrum is smoothed with an N/64 moving average, peak
/// normalized and floored at [`SPECTRAL_FLOOR`], then multiplied into the
/// signal spectrum. The caller re-normalizes the result to unit variance.
pub fn shape_spectrum(signal: &[f32], host: &[f32]) -> Vec<f32> {
    if signal.len() != host.len() || signal.is_empty() {
        return signal.to_vec();
    }
    let n_fft = signal.len().next_power_of_two();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let ifft = planner.plan_fft_inverse(n_fft);

    let mut host_spectrum: Vec<Complex32> =
        host.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    host_spectrum.resize(n_fft, Complex32::new(0.0, 0.0));
    fft.process(&mut host_spectrum);

    let mut signal_spectrum: Vec<Complex32> =
        signal.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    signal_spectrum.resize(n_fft, Complex32::new(0.0, 0.0));
    fft.process(&mut signal_spectrum);

    // Envelope over the non-negative frequencies; the negative half mirrors
    // it, keeping the shaped signal real.
    let half = n_fft / 2;
    let magnitude: Vec<f32> = host_spectrum[..=half].iter().map(|c| c.norm()).collect();
    let smoothed = moving_average(&magnitude, (n_fft / 64).max(1));
    let peak = smoothed.iter().cloned().fold(0.0f32, f32::max);
    let envelope: Vec<f32> = smoothed
        .iter()
        .map(|&m| {
            let normalized = if peak > 1e-9 { m / peak } else { m };
            normalized.max(SPECTRAL_FLOOR)
        })
        .collect();

    for (k, bin) in signal_spectrum.iter_mut().enumerate() {
        let index = if k <= half { k } else { n_fft - k };
        *bin *= envelope[index];
    }
    ifft.process(&mut signal_spectrum);

    let norm = 1.0 / n_fft as f32;
    signal_spectrum[..signal.len()]
        .iter()
        .map(|c| c.re * norm)
        .collect()
}

/// Centered moving average; edge windows are truncated.
fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    let n = values.len();
    let mut prefix = vec![0.0f64; n + 1];
    for (i, &v) in values.iter().enumerate() {
        prefix[i + 1] = prefix[i] + f64::from(v);
    }
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + window - half).min(n);
            ((prefix[hi] - prefix[lo]) / (hi - lo) as f64) as f32
        })
        .collect()
}
