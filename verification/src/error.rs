use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use witness_attestation::SchemaViolation;
use witness_registry::RegistryError;
use witness_types::{Did, WitnessType};

/// Why a single attestation was rejected.
///
/// Every variant except [`WitnessError::Registry`] is a local, recoverable
/// judgement about one attestation. `Registry` means the registry itself is
/// broken and the caller must stop.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WitnessError {
    #[error("Unknown witness: {0}")]
    UnknownWitness(Did),

    #[error("{witness_type} not authorized for {witness}")]
    UnauthorizedType {
        witness: Did,
        witness_type: WitnessType,
    },

    #[error("Attestation too old: {age_secs}s > {max_age_secs}s")]
    TooOld { age_secs: i64, max_age_secs: u64 },

    #[error("Attestation from future: {ahead_secs}s ahead (skew allowance {skew_secs}s)")]
    FromFuture { ahead_secs: i64, skew_secs: u64 },

    #[error("Nonce already used: {0}")]
    ReplayedNonce(String),

    #[error("Malformed claims: {0}")]
    MalformedClaims(#[from] SchemaViolation),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Witness {0} not in allowed list")]
    NotWhitelisted(Did),

    #[error("Witness {witness} reputation too low: {score:.2} < {min:.2}")]
    ReputationTooLow { witness: Did, score: f64, min: f64 },

    #[error("Witness shopping detected: {attempts} witnesses already consulted for event {event_hash}")]
    WitnessShopping { event_hash: String, attempts: usize },

    #[error("registry failure: {0}")]
    Registry(#[from] RegistryError),
}

impl WitnessError {
    /// Stale in either direction.
    pub fn is_stale(&self) -> bool {
        matches!(self, WitnessError::TooOld { .. } | WitnessError::FromFuture { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, WitnessError::Registry(_))
    }
}

/// Why a batch failed its quorum requirements.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuorumFailure {
    #[error("Insufficient witnesses: {verified} < {required}")]
    InsufficientWitnesses { verified: usize, required: usize },

    #[error("Missing required witness types: {}", TypeList(.missing))]
    MissingRequiredTypes { missing: BTreeSet<WitnessType> },

    #[error("Too many attestations: {count} > {max}")]
    BatchTooLarge { count: usize, max: usize },
}

struct TypeList<'a>(&'a BTreeSet<WitnessType>);

impl fmt::Display for TypeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{t}")?;
        }
        f.write_str("]")
    }
}

/// Failure to load or validate a [`crate::WitnessConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
