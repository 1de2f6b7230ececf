//! Witness attestation verification.
//!
//! Two layers over a shared [`witness_registry::WitnessRegistry`]:
//! 1. **[`AttestationVerifier`]** checks one attestation: known witness,
//!    capability, freshness, single-use nonce, claim schema, signature.
//! 2. **[`QuorumValidator`]** checks a batch against [`WitnessRequirements`]
//!    and produces the [`ValidationResult`] an authorization layer acts on.
//!
//! [`WitnessConfig`] carries the deployment knobs and loads from TOML.

pub mod config;
pub mod error;
pub mod quorum;
pub mod verifier;

pub use config::WitnessConfig;
pub use error::{ConfigError, QuorumFailure, WitnessError};
pub use quorum::{QuorumValidator, ValidationResult, WitnessRequirements};
pub use verifier::{AttestationVerifier, DEFAULT_FUTURE_SKEW_SECS, DEFAULT_MAX_AGE_SECS};
