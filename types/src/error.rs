//! Error type for parsing and validating fundamental types.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("unknown witness type: {0}")]
    UnknownWitnessType(String),

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("invalid hex in {what}: {reason}")]
    InvalidHex { what: &'static str, reason: String },

    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
