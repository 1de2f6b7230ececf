//! The witness attestation value type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use witness_types::{Did, Signature, Timestamp, WitnessType};

use crate::canonical::to_canonical_json;
use crate::error::AttestationError;

/// Type-specific claims carried by an attestation.
pub type Claims = BTreeMap<String, Value>;

/// A signed, typed claim made by a witness.
///
/// `signature` covers the canonical serialization of every other field (see
/// [`to_signing_data`](Self::to_signing_data)). Treat values as immutable once
/// signed: any change to a signed field invalidates verification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WitnessAttestation {
    #[serde(rename = "witness")]
    pub witness_did: Did,
    #[serde(rename = "type")]
    pub witness_type: WitnessType,
    pub claims: Claims,
    #[serde(rename = "sig")]
    pub signature: Signature,
    #[serde(rename = "ts")]
    pub timestamp: Timestamp,
    pub nonce: String,
    /// Entity the attestation is about.
    #[serde(default)]
    pub subject: Option<Did>,
    /// Hash of the witnessed event or transcript.
    #[serde(default)]
    pub event_hash: Option<String>,
    /// Policy identifier the claim was evaluated under.
    #[serde(default)]
    pub policy: Option<String>,
}

impl WitnessAttestation {
    /// Canonical bytes the signature is computed over.
    ///
    /// The wire object minus `sig`, with `subject`, `event_hash` and `policy`
    /// present only when set, encoded per [`crate::canonical`]. An empty
    /// `event_hash` or `policy` is treated as unset.
    pub fn to_signing_data(&self) -> Vec<u8> {
        let mut fields: serde_json::Map<String, Value> = serde_json::Map::new();
        fields.insert("witness".into(), Value::String(self.witness_did.to_string()));
        fields.insert("type".into(), Value::String(self.witness_type.as_str().into()));
        fields.insert(
            "claims".into(),
            Value::Object(self.claims.clone().into_iter().collect()),
        );
        fields.insert("ts".into(), Value::String(self.timestamp.to_iso8601()));
        fields.insert("nonce".into(), Value::String(self.nonce.clone()));
        if let Some(subject) = &self.subject {
            fields.insert("subject".into(), Value::String(subject.to_string()));
        }
        if let Some(event_hash) = self.event_hash.as_deref().filter(|s| !s.is_empty()) {
            fields.insert("event_hash".into(), Value::String(event_hash.to_string()));
        }
        if let Some(policy) = self.policy.as_deref().filter(|s| !s.is_empty()) {
            fields.insert("policy".into(), Value::String(policy.to_string()));
        }
        to_canonical_json(&Value::Object(fields)).into_bytes()
    }

    /// Wire/transport projection with short keys.
    pub fn to_dict(&self) -> Value {
        serde_json::to_value(self).expect("attestation fields are always representable as JSON")
    }

    /// Parse the wire projection produced by [`to_dict`](Self::to_dict).
    pub fn from_dict(value: Value) -> Result<Self, AttestationError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> String {
        self.to_dict().to_string()
    }

    pub fn from_json(s: &str) -> Result<Self, AttestationError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WitnessAttestation {
        WitnessAttestation {
            witness_did: Did::parse("did:web4:witness:time-1").unwrap(),
            witness_type: WitnessType::Time,
            claims: serde_json::from_value(json!({
                "ts": "2025-12-05T10:00:00+00:00",
                "nonce": "n1",
                "accuracy": 100
            }))
            .unwrap(),
            signature: Signature([0xAA; 64]),
            timestamp: Timestamp::from_unix_secs(1_764_928_800).unwrap(),
            nonce: "abc123".into(),
            subject: None,
            event_hash: None,
            policy: None,
        }
    }

    #[test]
    fn signing_data_is_sorted_compact_and_excludes_signature() {
        let data = String::from_utf8(sample().to_signing_data()).unwrap();
        assert_eq!(
            data,
            concat!(
                r#"{"claims":{"accuracy":100,"nonce":"n1","ts":"2025-12-05T10:00:00+00:00"},"#,
                r#""nonce":"abc123","ts":"2025-12-05T10:00:00+00:00","type":"time","#,
                r#""witness":"did:web4:witness:time-1"}"#
            )
        );
        assert!(!data.contains("sig"));
    }

    #[test]
    fn optional_fields_enter_signing_data_only_when_set() {
        let mut att = sample();
        let without = att.to_signing_data();
        att.subject = Some(Did::parse("did:web4:entity:bob").unwrap());
        att.policy = Some("policy:7".into());
        let with = String::from_utf8(att.to_signing_data()).unwrap();
        assert_ne!(without, with.as_bytes());
        assert!(with.contains(r#""policy":"policy:7","subject":"did:web4:entity:bob","ts""#));
        assert!(!with.contains("event_hash"));
    }

    #[test]
    fn empty_optional_fields_sign_like_absent_ones() {
        let absent = sample().to_signing_data();
        let mut att = sample();
        att.event_hash = Some(String::new());
        att.policy = Some(String::new());
        let data = att.to_signing_data();
        assert_eq!(data, absent);
        let text = String::from_utf8(data).unwrap();
        assert!(!text.contains("event_hash"));
        assert!(!text.contains("policy"));
    }

    #[test]
    fn signing_data_ignores_signature() {
        let mut att = sample();
        let before = att.to_signing_data();
        att.signature = Signature([0x11; 64]);
        assert_eq!(before, att.to_signing_data());
    }

    #[test]
    fn to_dict_uses_short_keys() {
        let dict = sample().to_dict();
        let obj = dict.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["claims", "event_hash", "nonce", "policy", "sig", "subject", "ts", "type", "witness"]
        );
        assert_eq!(obj["type"], json!("time"));
        assert_eq!(obj["ts"], json!("2025-12-05T10:00:00+00:00"));
        assert_eq!(obj["sig"], json!("aa".repeat(64)));
        assert_eq!(obj["subject"], Value::Null);
    }

    #[test]
    fn dict_round_trip() {
        let att = sample();
        let back = WitnessAttestation::from_dict(att.to_dict()).unwrap();
        assert_eq!(back, att);
        assert_eq!(back.to_signing_data(), att.to_signing_data());
    }

    #[test]
    fn from_dict_accepts_missing_optionals() {
        let mut dict = sample().to_dict();
        let obj = dict.as_object_mut().unwrap();
        obj.remove("subject");
        obj.remove("event_hash");
        obj.remove("policy");
        assert!(WitnessAttestation::from_dict(dict).is_ok());
    }

    #[test]
    fn from_dict_rejects_malformed_input() {
        let mut bad_type = sample().to_dict();
        bad_type["type"] = json!("gossip");
        assert!(WitnessAttestation::from_dict(bad_type).is_err());

        let mut bad_sig = sample().to_dict();
        bad_sig["sig"] = json!("deadbeef");
        assert!(WitnessAttestation::from_dict(bad_sig).is_err());

        let mut bad_witness = sample().to_dict();
        bad_witness["witness"] = json!("not a did");
        assert!(WitnessAttestation::from_dict(bad_witness).is_err());

        let mut bad_ts = sample().to_dict();
        bad_ts["ts"] = json!("noon");
        assert!(WitnessAttestation::from_dict(bad_ts).is_err());

        let mut extra = sample().to_dict();
        extra["unsigned_note"] = json!("trust me");
        assert!(WitnessAttestation::from_dict(extra).is_err());

        assert!(WitnessAttestation::from_json("[]").is_err());
    }
}
