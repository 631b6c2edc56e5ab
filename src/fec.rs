//! Forward error correction and integrity: systematic Hamming(7,4) and CRC-8.

use ndarray::{array, Array1, Array2};

use crate::errors::FecError;

/// CRC-8, polynomial 0x07, initial value 0x00, MSB-first, no reflection and
/// no final XOR. Used purely as an integrity gate so the extractor never
/// returns a fabricated ID.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Systematic Hamming(7,4): codeword is `d1 d2 d3 d4 p1 p2 p3` with
/// p1 = d1+d2+d4, p2 = d1+d3+d4, p3 = d2+d3+d4. Corrects any single bit
/// error per 7-bit block; multi-bit errors are left to the CRC.
#[derive(Debug, Clone)]
pub struct Hamming74 {
    generator: Array2<u8>,
    parity_check: Array2<u8>,
}

impl Hamming74 {
    pub fn new() -> Self {
        let generator = array![
            [1, 0, 0, 0, 1, 1, 0],
            [0, 1, 0, 0, 1, 0, 1],
            [0, 0, 1, 0, 0, 1, 1],
            [0, 0, 0, 1, 1, 1, 1],
        ];
        // H = [P^T | I3]
        let parity_check = array![
            [1, 1, 0, 1, 1, 0, 0],
            [1, 0, 1, 1, 0, 1, 0],
            [0, 1, 1, 1, 0, 0, 1],
        ];
        Self {
            generator,
            parity_check,
        }
    }

    /// Encode a bit array whose length is a multiple of 4 into 7-bit
    /// codewords.
    pub fn encode(&self, bits: &[u8]) -> Result<Vec<u8>, FecError> {
        if bits.len() % 4 != 0 {
            return Err(FecError::MalformedEncodeLength { len: bits.len() });
        }
        let mut encoded = Vec::with_capacity(bits.len() / 4 * 7);
        for nibble in bits.chunks(4) {
            let data = Array1::from_vec(nibble.to_vec());
            let codeword = data.dot(&self.generator).mapv(|v| v % 2);
            encoded.extend(codeword.iter().copied());
        }
        Ok(encoded)
    }

    /// Decode 7-bit blocks back to data nibbles, correcting up to one bit
    /// error per block via the syndrome.
    pub fn decode(&self, bits: &[u8]) -> Result<Vec<u8>, FecError> {
        if bits.len() % 7 != 0 {
            return Err(FecError::MalformedDecodeLength { len: bits.len() });
        }
        let mut decoded = Vec::with_capacity(bits.len() / 7 * 4);
        for block in bits.chunks(7) {
            let mut block = block.to_vec();
            let received = Array1::from_vec(block.clone());
            let syndrome = self.parity_check.dot(&received).mapv(|v| v % 2);
            let value = syndrome[0] | (syndrome[1] << 1) | (syndrome[2] << 2);
            if let Some(position) = Self::syndrome_position(value) {
                block[position] ^= 1;
            }
            decoded.extend_from_slice(&block[..4]);
        }
        Ok(decoded)
    }

    /// Syndrome value -> erroneous bit index, derived from the columns of H.
    fn syndrome_position(value: u8) -> Option<usize> {
        match value {
            3 => Some(0),
            5 => Some(1),
            6 => Some(2),
            7 => Some(3),
            1 => Some(4),
            2 => Some(5),
            4 => Some(6),
            _ => None,
        }
    }
}

impl Default for Hamming74 {
    fn default() -> Self {
        Self::new()
    }
}
