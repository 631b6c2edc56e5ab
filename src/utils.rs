//! Bitstream conversion helpers.

/// Convert an integer to an MSB-first bit array of fixed width.
pub fn int_to_bitstream(value: u64, bits: usize) -> Vec<u8> {
    assert!(bits > 0, "bit width must be positive");
    if bits < u64::BITS as usize {
        let limit = 1u64.checked_shl(bits as u32).unwrap_or(u64::MAX);
        assert!(value < limit, "value does not fit in bit width");
    }
    (0..bits)
        .rev()
        .map(|bit| ((value >> bit) & 1) as u8)
        .collect()
}

/// Fold an MSB-first bit array back into an integer.
pub fn bitstream_to_int(bits: &[u8]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit & 1))
}
