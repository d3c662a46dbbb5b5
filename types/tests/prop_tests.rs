use proptest::prelude::*;

use ballotchain_types::{BlockNumber, PreviousHash, Timestamp, VerificationCode, VoteHash};

fn code_symbols() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop::sample::select(VerificationCode::ALPHABET.to_vec()),
        VerificationCode::SYMBOLS,
    )
}

proptest! {
    /// VoteHash hex rendering parses back to the same digest.
    #[test]
    fn vote_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = VoteHash::new(bytes);
        let hex = hash.to_string();
        prop_assert_eq!(hex.len(), VoteHash::HEX_LEN);
        prop_assert_eq!(hex.parse::<VoteHash>().unwrap(), hash);
    }

    /// A block link never renders as anything that parses back as genesis.
    #[test]
    fn block_link_is_never_genesis(bytes in prop::array::uniform32(0u8..)) {
        let link = PreviousHash::Block(VoteHash::new(bytes));
        let parsed: PreviousHash = link.to_string().parse().unwrap();
        prop_assert!(!parsed.is_genesis());
        prop_assert_eq!(parsed, link);
    }

    /// VoteHash survives the bincode encoding used by the LMDB store.
    #[test]
    fn vote_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = VoteHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: VoteHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Timestamp ordering agrees with epoch-millisecond ordering.
    #[test]
    fn timestamp_ordering(a in 0i64..4_102_444_800_000, b in 0i64..4_102_444_800_000) {
        let ta = Timestamp::from_unix_millis(a).unwrap();
        let tb = Timestamp::from_unix_millis(b).unwrap();
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// The ISO rendering is fixed-width and parses back to the same instant.
    #[test]
    fn timestamp_iso_roundtrip(millis in 0i64..4_102_444_800_000) {
        let ts = Timestamp::from_unix_millis(millis).unwrap();
        let iso = ts.to_iso8601();
        prop_assert_eq!(iso.len(), 24);
        prop_assert!(iso.ends_with('Z'));
        prop_assert_eq!(iso.parse::<Timestamp>().unwrap(), ts);
    }

    /// Any 12 alphabet symbols form a code that parses back unchanged,
    /// including from lower case input.
    #[test]
    fn verification_code_parse(symbols in code_symbols()) {
        let code = VerificationCode::from_symbols(&symbols).unwrap();
        prop_assert_eq!(code.as_str().len(), VerificationCode::LEN);
        prop_assert_eq!(VerificationCode::parse(&code.as_str().to_lowercase()).unwrap(), code);
    }

    /// BlockNumber::next is strictly increasing.
    #[test]
    fn block_number_next(n in 0u64..u64::MAX) {
        let b = BlockNumber::new(n);
        prop_assert!(b.next() > b);
    }
}
