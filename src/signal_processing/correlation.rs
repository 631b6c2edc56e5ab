//! Cross-correlation and resampling support for synchronization.

use rustfft::{num_complex::Complex32, FftPlanner};

/// `valid`-mode cross-correlation: `out[i] = sum_j signal[i+j] * template[j]`
/// for `i` in `0..signal.len() - template.len() + 1`.
///
/// Computed via FFT (correlation theorem); the search windows here run to a
/// couple hundred thousand samples, where the direct sum is prohibitive.
pub fn correlate_valid(signal: &[f32], template: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let m = template.len();
    if m == 0 || n < m {
        return Vec::new();
    }
    let out_len = n - m + 1;
    let n_fft = (n + m).next_power_of_two();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let ifft = planner.plan_fft_inverse(n_fft);

    let mut signal_fft: Vec<Complex32> = signal.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    signal_fft.resize(n_fft, Complex32::new(0.0, 0.0));
    fft.process(&mut signal_fft);

    let mut template_fft: Vec<Complex32> =
        template.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    template_fft.resize(n_fft, Complex32::new(0.0, 0.0));
    fft.process(&mut template_fft);

    for (s, t) in signal_fft.iter_mut().zip(&template_fft) {
        *s *= t.conj();
    }
    ifft.process(&mut signal_fft);

    let norm = 1.0 / n_fft as f32;
    signal_fft[..out_len].iter().map(|c| c.re * norm).collect()
}

/// Index and signed value of the largest-magnitude correlation sample.
/// The sign carries the received polarity. First index wins ties.
pub fn peak(correlation: &[f32]) -> Option<(usize, f32)> {
    if correlation.is_empty() {
        return None;
    }
    let mut best = 0usize;
    for (i, &value) in correlation.iter().enumerate() {
        if value.abs() > correlation[best].abs() {
            best = i;
        }
    }
    Some((best, correlation[best]))
}

/// Linear resampling onto `new_len` evenly spaced points across the same
/// span. Sufficient for the small (<= a few percent) speed corrections the
/// sync loop applies; this aligns chip timing, it does not preserve fidelity.
pub fn resample_linear(input: &[f32], new_len: usize) -> Vec<f32> {
    if input.is_empty() || new_len == 0 {
        return Vec::new();
    }
    if input.len() == 1 || new_len == 1 {
        return vec![input[0]; new_len];
    }
    let step = (input.len() - 1) as f64 / (new_len - 1) as f64;
    let last = input.len() - 1;
    (0..new_len)
        .map(|j| {
            let position = j as f64 * step;
            let index = (position.floor() as usize).min(last);
            let fraction = position - index as f64;
            if index == last {
                input[last]
            } else {
                (f64::from(input[index]) * (1.0 - fraction)
                    + f64::from(input[index + 1]) * fraction) as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn correlate_naive(signal: &[f32], template: &[f32]) -> Vec<f32> {
        (0..=signal.len() - template.len())
            .map(|i| {
                template
                    .iter()
                    .enumerate()
                    .map(|(j, &t)| signal[i + j] * t)
                    .sum()
            })
            .collect()
    }

    #[test]
    fn fft_correlation_matches_direct_sum() {
        let signal: Vec<f32> = (0..200).map(|i| ((i * 13) % 7) as f32 - 3.0).collect();
        let template: Vec<f32> = (0..31).map(|i| ((i * 5) % 3) as f32 - 1.0).collect();
        let fast = correlate_valid(&signal, &template);
        let slow = correlate_naive(&signal, &template);
        assert_eq!(fast.len(), slow.len());
        for (f, s) in fast.iter().zip(&slow) {
            assert_relative_eq!(f, s, epsilon = 1e-3);
        }
    }

    #[test]
    fn correlation_peaks_at_embedded_offset() {
        let template: Vec<f32> = (0..64).map(|i| if (i * 11) % 3 == 0 { 1.0 } else { -1.0 }).collect();
        let mut signal = vec![0.0f32; 1_000];
        signal[417..417 + 64].copy_from_slice(&template);
        let (index, value) = peak(&correlate_valid(&signal, &template)).unwrap();
        assert_eq!(index, 417);
        assert!(value > 0.0);
    }

    #[test]
    fn peak_sign_tracks_polarity() {
        let template: Vec<f32> = (0..64).map(|i| if (i * 11) % 3 == 0 { 1.0 } else { -1.0 }).collect();
        let mut signal = vec![0.0f32; 500];
        for (i, &t) in template.iter().enumerate() {
            signal[100 + i] = -t;
        }
        let (index, value) = peak(&correlate_valid(&signal, &template)).unwrap();
        assert_eq!(index, 100);
        assert!(value < 0.0);
    }

    #[test]
    fn short_signal_yields_empty_correlation() {
        assert!(correlate_valid(&[1.0; 10], &[1.0; 20]).is_empty());
        assert_eq!(peak(&[]), None);
    }

    #[test]
    fn resample_preserves_endpoints() {
        let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let output = resample_linear(&input, 103);
        assert_relative_eq!(output[0], 0.0);
        assert_relative_eq!(output[102], 99.0, epsilon = 1e-4);
        assert_eq!(output.len(), 103);
    }

    #[test]
    fn resample_of_linear_ramp_stays_linear() {
        let input: Vec<f32> = (0..50).map(|i| 2.0 * i as f32).collect();
        let output = resample_linear(&input, 99);
        for (j, &y) in output.iter().enumerate() {
            let expected = 2.0 * 49.0 * j as f32 / 98.0;
            assert_relative_eq!(y, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn resample_degenerate_lengths() {
        assert_eq!(resample_linear(&[], 10), Vec::<f32>::new());
        assert_eq!(resample_linear(&[5.0], 4), vec![5.0; 4]);
        assert_eq!(resample_linear(&[1.0, 3.0], 1), vec![1.0]);
    }
}
