//! Channel impairment simulation.
//!
//! Helpers that degrade watermarked audio the way real capture chains do:
//! additive noise, operator AGC gain, telephony band-limiting, and small
//! speed changes. Backs the robustness test-suites and benchmarks.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::signal_processing::{resample_linear, BandpassFilter};

/// Add white Gaussian noise with the given standard deviation.
pub fn apply_awgn<R: Rng>(audio: &[f32], noise_std: f64, rng: &mut R) -> Vec<f32> {
    audio
        .iter()
        .map(|&sample| {
            let noise: f64 = rng.sample(StandardNormal);
            sample + (noise * noise_std) as f32
        })
        .collect()
}

/// Uniform gain, as applied by an operator AGC stage.
pub fn apply_gain(audio: &[f32], gain: f32) -> Vec<f32> {
    audio.iter().map(|&sample| sample * gain).collect()
}

/// Band-limit to the 500-3000 Hz telephony band.
pub fn telephone_bandlimit(audio: &[f32], sample_rate: usize) -> Vec<f32> {
    BandpassFilter::telecom(sample_rate).filter(audio)
}

/// Play back `factor` times faster: the signal shortens and every embedded
/// interval shrinks by the same factor.
pub fn change_speed(audio: &[f32], factor: f64) -> Vec<f32> {
    let new_len = (audio.len() as f64 / factor).round() as usize;
    resample_linear(audio, new_len)
}
