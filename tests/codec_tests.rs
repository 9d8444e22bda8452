//! Codec tests
//!
//! Properties of the base62 short code mapping.

use scanty::errors::ScantyError;
use scanty::utils::base62::{MAX_CODE_LEN, decode, encode};

#[test]
fn test_round_trip_at_boundaries() {
    for id in [
        0u64,
        1,
        61,
        62,
        3843,
        3844,
        u32::MAX as u64,
        1 << 63,
        u64::MAX - 1,
        u64::MAX,
    ] {
        assert_eq!(decode(&encode(id)).unwrap(), id, "id {}", id);
    }
}

#[test]
fn test_round_trip_random_ids() {
    for _ in 0..10_000 {
        let id = rand::random::<u64>();
        let code = encode(id);
        assert!(code.len() <= MAX_CODE_LEN);
        assert_eq!(decode(&code).unwrap(), id);
    }
}

#[test]
fn test_codes_use_only_alphanumerics() {
    for _ in 0..1000 {
        let code = encode(rand::random::<u64>());
        assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()), "{}", code);
    }
}

#[test]
fn test_foreign_characters_rejected() {
    for bad in ["abc-def", "a b", "é", "abc_", "xyz/", "+1", "12.5"] {
        match decode(bad) {
            Err(ScantyError::InvalidCode(_)) => {}
            other => panic!("{:?} decoded to {:?}", bad, other),
        }
    }
}

#[test]
fn test_encoding_is_injective_on_neighbours() {
    let base = rand::random::<u64>() >> 1;
    let codes: std::collections::HashSet<String> = (base..base + 500).map(encode).collect();
    assert_eq!(codes.len(), 500);
}
