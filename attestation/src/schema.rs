//! Per-type claim schemas.
//!
//! Which claim keys a witness type must carry is data, not code: adding a
//! witness type means adding a row to [`CLAIM_SCHEMAS`].

use serde_json::Value;
use std::fmt;
use witness_types::WitnessType;

use crate::attestation::Claims;
use crate::error::SchemaViolation;

/// Expected JSON shape of a claim value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimKind {
    Any,
    Bool,
    String,
}

impl ClaimKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ClaimKind::Any => true,
            ClaimKind::Bool => value.is_boolean(),
            ClaimKind::String => value.is_string(),
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimKind::Any => f.write_str("any value"),
            ClaimKind::Bool => f.write_str("a boolean"),
            ClaimKind::String => f.write_str("a string"),
        }
    }
}

/// One mandatory claim key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimRequirement {
    pub key: &'static str,
    pub kind: ClaimKind,
}

const fn any(key: &'static str) -> ClaimRequirement {
    ClaimRequirement { key, kind: ClaimKind::Any }
}

const fn boolean(key: &'static str) -> ClaimRequirement {
    ClaimRequirement { key, kind: ClaimKind::Bool }
}

const fn string(key: &'static str) -> ClaimRequirement {
    ClaimRequirement { key, kind: ClaimKind::String }
}

/// Mandatory claims per witness type, checked in row order.
pub const CLAIM_SCHEMAS: &[(WitnessType, &[ClaimRequirement])] = &[
    (WitnessType::Time, &[any("ts"), any("nonce")]),
    (
        WitnessType::Audit,
        &[string("policy_id"), boolean("policy_met"), any("evidence")],
    ),
    (
        WitnessType::AuditMinimal,
        &[boolean("digest_valid"), boolean("rate_ok")],
    ),
    (WitnessType::Oracle, &[any("source"), any("data"), any("ts")]),
    (WitnessType::Existence, &[any("observed_at"), any("method")]),
    (
        WitnessType::Action,
        &[string("action"), any("actor"), any("outcome")],
    ),
    (WitnessType::State, &[any("state"), any("measurement")]),
    (WitnessType::Quality, &[any("metric"), any("value")]),
];

/// Mandatory claims for `witness_type` (empty if it has no row).
pub fn required_claims(witness_type: WitnessType) -> &'static [ClaimRequirement] {
    CLAIM_SCHEMAS
        .iter()
        .find(|(t, _)| *t == witness_type)
        .map(|(_, reqs)| *reqs)
        .unwrap_or(&[])
}

/// Check `claims` against the schema of `witness_type`, reporting the first violation.
///
/// Extra keys beyond the mandatory ones are allowed.
pub fn check_claims(witness_type: WitnessType, claims: &Claims) -> Result<(), SchemaViolation> {
    for req in required_claims(witness_type) {
        let Some(value) = claims.get(req.key) else {
            return Err(SchemaViolation::MissingClaim {
                witness_type,
                key: req.key,
            });
        };
        if !req.kind.accepts(value) {
            return Err(SchemaViolation::WrongKind {
                witness_type,
                key: req.key,
                expected: req.kind,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(v: Value) -> Claims {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn every_witness_type_has_a_schema_row() {
        for t in WitnessType::ALL {
            assert!(!required_claims(t).is_empty(), "{t} has no schema");
        }
        assert_eq!(CLAIM_SCHEMAS.len(), WitnessType::ALL.len());
    }

    #[test]
    fn complete_audit_claims_pass() {
        let c = claims(json!({"policy_id": "p1", "policy_met": true, "evidence": "sha:abc"}));
        assert_eq!(check_claims(WitnessType::Audit, &c), Ok(()));
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let c = claims(json!({"policy_id": "p1", "policy_met": true}));
        let err = check_claims(WitnessType::Audit, &c).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::MissingClaim {
                witness_type: WitnessType::Audit,
                key: "evidence"
            }
        );
        assert!(err.to_string().contains("missing 'evidence'"));
    }

    #[test]
    fn first_missing_key_in_table_order_wins() {
        let c = claims(json!({}));
        let err = check_claims(WitnessType::Oracle, &c).unwrap_err();
        assert!(err.to_string().contains("missing 'source'"));
    }

    #[test]
    fn policy_met_must_be_boolean() {
        let c = claims(json!({"policy_id": "p1", "policy_met": "yes", "evidence": "e"}));
        let err = check_claims(WitnessType::Audit, &c).unwrap_err();
        assert_eq!(
            err.to_string(),
            "audit witness claim 'policy_met' must be a boolean"
        );
    }

    #[test]
    fn extra_claims_are_allowed() {
        let c = claims(json!({"ts": "2025-12-05T10:00:00+00:00", "nonce": "n1", "accuracy": 100}));
        assert_eq!(check_claims(WitnessType::Time, &c), Ok(()));
    }

    #[test]
    fn action_requires_action_actor_outcome() {
        let keys: Vec<&str> = required_claims(WitnessType::Action)
            .iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, ["action", "actor", "outcome"]);
    }
}
