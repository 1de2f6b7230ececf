#![no_main]

use libfuzzer_sys::fuzz_target;
use witness_attestation::WitnessAttestation;

fuzz_target!(|data: &[u8]| {
    // Decoding untrusted wire input must never panic.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = witness_types::Did::parse(text);
    let _ = witness_types::Timestamp::parse_iso8601(text);

    if let Ok(att) = WitnessAttestation::from_json(text) {
        // Anything that parses must re-encode to something that parses to the same value.
        let again = WitnessAttestation::from_json(&att.to_json()).expect("re-encoded attestation parses");
        assert_eq!(again, att);
        let _ = att.to_signing_data();
    }
});
