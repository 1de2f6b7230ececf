use proptest::prelude::*;

use witness_types::{Did, Timestamp, WitnessType};

proptest! {
    /// Canonical ISO-8601 text parses back to the same instant.
    #[test]
    fn timestamp_iso8601_roundtrip(micros in 0i64..4_102_444_800_000_000) {
        let ts = Timestamp::from_unix_micros(micros).unwrap();
        let parsed = Timestamp::parse_iso8601(&ts.to_iso8601()).unwrap();
        prop_assert_eq!(parsed, ts);
        prop_assert_eq!(parsed.as_unix_micros(), micros);
    }

    /// Canonical text always carries the UTC offset and a fraction of 0 or 6 digits.
    #[test]
    fn timestamp_iso8601_shape(micros in 0i64..4_102_444_800_000_000) {
        let text = Timestamp::from_unix_micros(micros).unwrap().to_iso8601();
        prop_assert!(text.ends_with("+00:00"));
        let len = text.len();
        prop_assert!(len == 25 || len == 32, "unexpected length {}: {}", len, text);
    }

    /// Timestamp ordering agrees with the underlying microseconds.
    #[test]
    fn timestamp_ordering(a in 0i64..4_102_444_800_000_000, b in 0i64..4_102_444_800_000_000) {
        let ta = Timestamp::from_unix_micros(a).unwrap();
        let tb = Timestamp::from_unix_micros(b).unwrap();
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(tb.micros_since(ta), b - a);
    }

    /// offset_secs moves by exactly the requested number of seconds.
    #[test]
    fn timestamp_offset_secs(base in 1_000_000i64..2_000_000_000, delta in -1_000_000i64..1_000_000) {
        let t = Timestamp::from_unix_secs(base).unwrap();
        prop_assert_eq!(t.offset_secs(delta).as_unix_secs(), base + delta);
    }

    /// Any identifier built from the allowed alphabet parses.
    #[test]
    fn did_allowed_alphabet_parses(s in "[A-Za-z0-9:_.-]{1,256}") {
        let did = Did::parse(s.clone()).unwrap();
        prop_assert_eq!(did.as_str(), s.as_str());
    }

    /// Any identifier containing whitespace is rejected.
    #[test]
    fn did_with_whitespace_rejected(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
        let s = format!("{prefix} {suffix}");
        prop_assert!(Did::parse(s).is_err());
    }

    /// Witness type strings round-trip through FromStr.
    #[test]
    fn witness_type_roundtrip(idx in 0usize..8) {
        let t = WitnessType::ALL[idx];
        prop_assert_eq!(t.as_str().parse::<WitnessType>().unwrap(), t);
    }
}
