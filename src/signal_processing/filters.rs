//! IIR and FIR filters shared by the embed and extract paths.

use std::f64::consts::PI;

use num_complex::Complex64;

/// Telecom passband edges (GSM/AMR-friendly).
pub const TELECOM_LOW_HZ: f64 = 500.0;
pub const TELECOM_HIGH_HZ: f64 = 3000.0;

/// Pre-emphasis zero; whitens narrowband hosts before correlation.
pub const PREEMPHASIS_COEFF: f32 = 0.95;

/// 2nd-order Butterworth band-pass (4th-order transfer function), designed
/// with the standard analog-prototype / band-transform / bilinear chain and
/// applied as a causal direct-form filter.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    b: [f64; 5],
    a: [f64; 5],
}

impl BandpassFilter {
    /// The 500-3000 Hz telecom band-pass.
    pub fn telecom(sample_rate: usize) -> Self {
        Self::new(TELECOM_LOW_HZ, TELECOM_HIGH_HZ, sample_rate)
    }

    pub fn new(low_hz: f64, high_hz: f64, sample_rate: usize) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        // Pre-warp the normalized band edges for the bilinear transform
        // (internal sampling frequency of 2).
        let warped_low = 4.0 * (PI * (low_hz / nyquist) / 2.0).tan();
        let warped_high = 4.0 * (PI * (high_hz / nyquist) / 2.0).tan();
        let bandwidth = warped_high - warped_low;
        let center = (warped_low * warped_high).sqrt();

        // Analog Butterworth prototype poles for order 2.
        let prototype = [
            Complex64::from_polar(1.0, 3.0 * PI / 4.0),
            Complex64::from_polar(1.0, 5.0 * PI / 4.0),
        ];

        // Low-pass -> band-pass: each pole splits in two, and one zero per
        // prototype pole appears at s = 0.
        let mut poles = Vec::with_capacity(4);
        for &p in &prototype {
            let scaled = p * (bandwidth / 2.0);
            let offset = (scaled * scaled - Complex64::new(center * center, 0.0)).sqrt();
            poles.push(scaled + offset);
            poles.push(scaled - offset);
        }
        let zeros = [Complex64::new(0.0, 0.0); 2];
        let gain = bandwidth * bandwidth;

        // Bilinear transform; the two remaining zeros map to z = -1.
        let fs2 = Complex64::new(4.0, 0.0);
        let z_poles: Vec<Complex64> = poles.iter().map(|&s| (fs2 + s) / (fs2 - s)).collect();
        let mut z_zeros: Vec<Complex64> = zeros.iter().map(|&s| (fs2 + s) / (fs2 - s)).collect();
        while z_zeros.len() < z_poles.len() {
            z_zeros.push(Complex64::new(-1.0, 0.0));
        }

        let one = Complex64::new(1.0, 0.0);
        let numerator = zeros.iter().fold(one, |acc, &s| acc * (fs2 - s));
        let denominator = poles.iter().fold(one, |acc, &s| acc * (fs2 - s));
        let k = gain * (numerator / denominator).re;

        let b_poly = polynomial_from_roots(&z_zeros);
        let a_poly = polynomial_from_roots(&z_poles);
        let mut b = [0.0f64; 5];
        let mut a = [0.0f64; 5];
        for i in 0..5 {
            b[i] = k * b_poly[i].re;
            a[i] = a_poly[i].re;
        }
        Self { b, a }
    }

    /// Causal direct-form-II-transposed filtering.
    pub fn filter(&self, input: &[f32]) -> Vec<f32> {
        let (b, a) = (&self.b, &self.a);
        let mut z = [0.0f64; 4];
        input
            .iter()
            .map(|&sample| {
                let x = f64::from(sample);
                let y = b[0] * x + z[0];
                z[0] = b[1] * x - a[1] * y + z[1];
                z[1] = b[2] * x - a[2] * y + z[2];
                z[2] = b[3] * x - a[3] * y + z[3];
                z[3] = b[4] * x - a[4] * y;
                y as f32
            })
            .collect()
    }
}

/// Expand monic `prod (x - r_i)` into descending-power coefficients.
fn polynomial_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coefficients = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        coefficients.push(Complex64::new(0.0, 0.0));
        for i in (1..coefficients.len()).rev() {
            let carry = coefficients[i - 1];
            coefficients[i] -= root * carry;
        }
    }
    coefficients
}

/// One-zero whitening filter `y[n] = x[n] - 0.95 x[n-1]`, applied
/// identically to received audio and correlation reference in non-telecom
/// extraction.
pub fn preemphasis(input: &[f32]) -> Vec<f32> {
    let mut previous = 0.0f32;
    input
        .iter()
        .map(|&x| {
            let y = x - PREEMPHASIS_COEFF * previous;
            previous = x;
            y
        })
        .collect()
}
