use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

use witness_attestation::canonical::to_canonical_json;
use witness_attestation::{AttestationFactory, Claims, WitnessAttestation};
use witness_crypto::{keypair_from_seed, verify_signature, Ed25519Scheme};
use witness_nullables::NullClock;
use witness_types::{Did, KeyPair, WitnessType};

fn signed(claim_value: &str, seed: u8) -> (WitnessAttestation, KeyPair) {
    let kp = keypair_from_seed(&[seed; 32]);
    let factory = AttestationFactory::new(
        Arc::new(Ed25519Scheme),
        Arc::new(NullClock::at_secs(1_764_928_800)),
    );
    let mut claims = Claims::new();
    claims.insert("metric".into(), json!("uptime"));
    claims.insert("value".into(), json!(claim_value));
    let att = factory.create_attestation(
        Did::parse("did:web4:witness:q1").unwrap(),
        WitnessType::Quality,
        claims,
        &kp.private,
    );
    (att, kp)
}

fn verifies(att: &WitnessAttestation, kp: &KeyPair) -> bool {
    verify_signature(&att.to_signing_data(), &att.signature, &kp.public)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Changing any claim value after signing breaks the signature.
    #[test]
    fn tampered_claims_fail(original in "[a-z0-9]{1,16}", forged in "[a-z0-9]{1,16}", seed in any::<u8>()) {
        prop_assume!(original != forged);
        let (mut att, kp) = signed(&original, seed);
        prop_assert!(verifies(&att, &kp));
        att.claims.insert("value".into(), json!(forged));
        prop_assert!(!verifies(&att, &kp));
    }

    /// Adding an unsigned claim breaks the signature.
    #[test]
    fn injected_claim_fails(key in "[a-z_]{1,12}", seed in any::<u8>()) {
        prop_assume!(key != "metric" && key != "value");
        let (mut att, kp) = signed("99.9", seed);
        att.claims.insert(key, json!(true));
        prop_assert!(!verifies(&att, &kp));
    }

    /// Moving the timestamp by any nonzero amount breaks the signature.
    #[test]
    fn shifted_timestamp_fails(delta in prop_oneof![-86_400i64..0, 1i64..86_400], seed in any::<u8>()) {
        let (mut att, kp) = signed("ok", seed);
        att.timestamp = att.timestamp.offset_secs(delta);
        prop_assert!(!verifies(&att, &kp));
    }

    /// Swapping the envelope nonce breaks the signature.
    #[test]
    fn swapped_nonce_fails(nonce in "[0-9a-f]{32}", seed in any::<u8>()) {
        let (mut att, kp) = signed("ok", seed);
        prop_assume!(att.nonce != nonce);
        att.nonce = nonce;
        prop_assert!(!verifies(&att, &kp));
    }

    /// Re-labelling the witness or the witness type breaks the signature.
    #[test]
    fn relabelled_attestation_fails(idx in 0usize..8, name in "[a-z]{1,10}", seed in any::<u8>()) {
        let (att, kp) = signed("ok", seed);

        let relabelled_type = WitnessType::ALL[idx];
        if relabelled_type != att.witness_type {
            let mut forged = att.clone();
            forged.witness_type = relabelled_type;
            prop_assert!(!verifies(&forged, &kp));
        }

        let mut forged = att.clone();
        forged.witness_did = Did::parse(format!("did:web4:witness:{name}x")).unwrap();
        prop_assert!(!verifies(&forged, &kp));
    }

    /// Canonical encoding is pure ASCII and ignores map insertion order.
    #[test]
    fn canonical_json_is_ascii_and_order_independent(
        entries in proptest::collection::btree_map("\\PC{1,8}", "\\PC{0,12}", 0..6)
    ) {
        let forward: serde_json::Map<String, Value> =
            entries.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
        let reverse: serde_json::Map<String, Value> =
            entries.iter().rev().map(|(k, v)| (k.clone(), json!(v))).collect();
        let a = to_canonical_json(&Value::Object(forward));
        let b = to_canonical_json(&Value::Object(reverse));
        prop_assert!(a.is_ascii());
        prop_assert_eq!(&a, &b);
        // Canonical text is still valid JSON for the same value.
        let parsed: Value = serde_json::from_str(&a).unwrap();
        prop_assert_eq!(parsed.as_object().map(|m| m.len()), Some(entries.len()));
    }
}
