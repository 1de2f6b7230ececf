use thiserror::Error;
use witness_types::WitnessType;

use crate::schema::ClaimKind;

/// Failure to decode an attestation from its wire form.
#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("malformed attestation: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for AttestationError {
    fn from(e: serde_json::Error) -> Self {
        AttestationError::Malformed(e.to_string())
    }
}

/// A claims map that does not satisfy its witness type's schema.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("{witness_type} witness missing '{key}' claim")]
    MissingClaim {
        witness_type: WitnessType,
        key: &'static str,
    },

    #[error("{witness_type} witness claim '{key}' must be {expected}")]
    WrongKind {
        witness_type: WitnessType,
        key: &'static str,
        expected: ClaimKind,
    },
}
