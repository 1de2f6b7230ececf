#![no_main]

use libfuzzer_sys::fuzz_target;
use witness_attestation::canonical::to_canonical_json;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let canonical = to_canonical_json(&value);
    assert!(canonical.is_ascii());

    // Canonical text is valid JSON and a fixed point of the encoding.
    let reparsed: serde_json::Value =
        serde_json::from_str(&canonical).expect("canonical output is valid JSON");
    assert_eq!(to_canonical_json(&reparsed), canonical);
});
