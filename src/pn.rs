//! Deterministic pseudo-noise generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate a pseudo-noise sequence of `length` chips in {-1.0, +1.0}.
///
/// The generator state is local to the call: the same `(length, seed)` pair
/// produces the same sequence on every call and every platform. Embedder and
/// extractor despread against this exact stream, so it is part of the wire
/// contract for a given deployment.
pub fn generate_pn(length: usize, seed: u32) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
    (0..length)
        .map(|_| (rng.gen_range(0..2i32) * 2 - 1) as f32)
        .collect()
}
