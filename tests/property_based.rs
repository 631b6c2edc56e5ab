use proptest::prelude::*;

use aquamark::fec::{crc8, Hamming74};
use aquamark::pn::generate_pn;
use aquamark::{protocol, utils, WatermarkConfig, Watermarker};

proptest! {
    /// The PN stream is pure: same inputs, same chips, always antipodal.
    #[test]
    fn pn_is_deterministic_and_antipodal(len in 1usize..4096, seed in any::<u32>()) {
        let first = generate_pn(len, seed);
        let second = generate_pn(len, seed);
        prop_assert_eq!(first.len(), len);
        prop_assert!(first.iter().all(|&chip| chip == 1.0 || chip == -1.0));
        prop_assert_eq!(first, second);
    }

    /// Any single flipped payload bit changes the CRC, so a corrupted
    /// decode can never be reported as a valid ID.
    #[test]
    fn crc_gate_catches_any_payload_bit_flip(payload in any::<u32>(), bit in 0u32..32) {
        let crc = crc8(&payload.to_be_bytes());
        let flipped = payload ^ (1 << bit);
        prop_assert_ne!(crc8(&flipped.to_be_bytes()), crc);
    }

    /// One bit error anywhere in the 70 coded bits is always corrected.
    #[test]
    fn hamming_corrects_any_single_bit(
        data in prop::collection::vec(0u8..2, 40),
        position in 0usize..70,
    ) {
        let fec = Hamming74::new();
        let mut coded = fec.encode(&data).unwrap();
        coded[position] ^= 1;
        prop_assert_eq!(fec.decode(&coded).unwrap(), data);
    }

    /// Frame payload bits decode back to the embedded ID for the whole
    /// 28-bit space.
    #[test]
    fn frame_payload_bits_roundtrip(id in 0u32..(1 << 28)) {
        let frame = protocol::build_frame(id).unwrap();
        let payload = &frame[protocol::PREAMBLE_LEN..protocol::PREAMBLE_LEN + protocol::ENCODED_PAYLOAD_BITS];
        prop_assert_eq!(protocol::decode_payload(payload).unwrap(), Some(id));
    }

    #[test]
    fn bitstream_roundtrip(value in any::<u32>()) {
        let bits = utils::int_to_bitstream(u64::from(value), 32);
        prop_assert_eq!(bits.len(), 32);
        prop_assert_eq!(utils::bitstream_to_int(&bits), u64::from(value));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Full acoustic round-trip over digital silence, across the ID space.
    #[test]
    fn roundtrip_on_silence(id in 0u32..(1 << 28)) {
        let watermarker = Watermarker::new(WatermarkConfig {
            chip_rate: 64,
            ..Default::default()
        })
        .unwrap();
        let host = vec![0.0f32; watermarker.frame_len() + 1_000];
        let marked = watermarker.embed(&host, id).unwrap();
        prop_assert_eq!(marked.len(), host.len());
        prop_assert_eq!(watermarker.extract(&marked).unwrap(), Some(id));
    }
}
