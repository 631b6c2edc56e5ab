//! Frame layout and bit-level protocol.
//!
//! One frame is `[Preamble:16][Interleaved coded payload:70][Trailer:16]`,
//! 102 bits total; the trailer repeats the preamble so the extractor can
//! measure the preamble-to-trailer distance and estimate speed drift.
//!
//! The 70 coded bits are Hamming(7,4) over a 40-bit data block:
//! 28-bit content ID, 4-bit protocol version, then CRC-8 over the 4-byte
//! big-endian encoding of the versioned 32-bit payload.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::errors::{FecError, WatermarkError};
use crate::fec::{crc8, Hamming74};
use crate::utils::{bitstream_to_int, int_to_bitstream};

/// Barker-13 (+ + + + + - - + + - + - +) padded with three zero bits, for
/// a sharp correlation peak at 16 bits.
pub const PREAMBLE_BITS: [u8; 16] = [1, 1, 1, 1, 1, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 0];
pub const PREAMBLE_LEN: usize = PREAMBLE_BITS.len();

/// Hamming(7,4) over the 40-bit data block.
pub const ENCODED_PAYLOAD_BITS: usize = 70;
pub const DATA_BITS: usize = 40;
pub const PAYLOAD_BITS: usize = 32;
pub const CRC_BITS: usize = 8;
pub const FRAME_BITS: usize = PREAMBLE_LEN + ENCODED_PAYLOAD_BITS + PREAMBLE_LEN;

/// Interleaver permutation seed. Fixed and distinct from the spreading
/// seed; part of the wire contract.
pub const INTERLEAVER_SEED: u64 = 0xDEAD_BEEF;

pub const PROTOCOL_VERSION: u32 = 1;
/// IDs occupy the low 28 bits of the payload; the top 4 carry the version.
pub const MAX_ID: u32 = 1 << 28;

/// The fixed length-70 interleaver permutation.
fn permutation() -> Vec<usize> {
    let mut indices: Vec<usize> = (0..ENCODED_PAYLOAD_BITS).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(INTERLEAVER_SEED);
    indices.shuffle(&mut rng);
    indices
}

/// Scatter coded bits before spreading so a burst of chip errors lands in
/// different Hamming blocks.
pub fn interleave(bits: &[u8]) -> Vec<u8> {
    debug_assert_eq!(bits.len(), ENCODED_PAYLOAD_BITS);
    let perm = permutation();
    perm.iter().map(|&source| bits[source]).collect()
}

/// Invert [`interleave`].
pub fn deinterleave(bits: &[u8]) -> Vec<u8> {
    debug_assert_eq!(bits.len(), ENCODED_PAYLOAD_BITS);
    let perm = permutation();
    let mut output = vec![0u8; bits.len()];
    for (i, &destination) in perm.iter().enumerate() {
        output[destination] = bits[i];
    }
    output
}

/// Build the complete 102-bit frame for `id`: versioned payload, CRC-8,
/// Hamming encode, interleave, preamble sandwich.
pub fn build_frame(id: u32) -> Result<Vec<u8>, WatermarkError> {
    if id >= MAX_ID {
        return Err(WatermarkError::InvalidId { id });
    }
    let payload = (PROTOCOL_VERSION << 28) | id;

    let mut data = int_to_bitstream(u64::from(payload), PAYLOAD_BITS);
    let crc = crc8(&payload.to_be_bytes());
    data.extend(int_to_bitstream(u64::from(crc), CRC_BITS));

    let encoded = Hamming74::new().encode(&data)?;
    let interleaved = interleave(&encoded);

    let mut frame = Vec::with_capacity(FRAME_BITS);
    frame.extend_from_slice(&PREAMBLE_BITS);
    frame.extend(interleaved);
    frame.extend_from_slice(&PREAMBLE_BITS);
    Ok(frame)
}

/// Recover the content ID from the 70 demodulated payload bits. Returns
/// `None` when the CRC or the version field rejects the block.
pub fn decode_payload(raw_bits: &[u8]) -> Result<Option<u32>, FecError> {
    let deinterleaved = deinterleave(raw_bits);
    let decoded = Hamming74::new().decode(&deinterleaved)?;

    let payload = bitstream_to_int(&decoded[..PAYLOAD_BITS]) as u32;
    let received_crc = bitstream_to_int(&decoded[PAYLOAD_BITS..]) as u8;

    if crc8(&payload.to_be_bytes()) != received_crc {
        return Ok(None);
    }
    // An all-zero demodulation is CRC-consistent, so the version field is
    // load-bearing: it rejects silence and declares the format revision.
    if payload >> 28 != PROTOCOL_VERSION {
        return Ok(None);
    }
    Ok(Some(payload & (MAX_ID - 1)))
}
