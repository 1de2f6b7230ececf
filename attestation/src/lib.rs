//! Witness attestations: the signed, typed claims a witness issues.
//!
//! - [`WitnessAttestation`] is the value type, with its canonical signing
//!   bytes ([`WitnessAttestation::to_signing_data`]) and wire projection
//!   ([`WitnessAttestation::to_dict`]).
//! - [`schema`] is the static table of claim keys each witness type must carry.
//! - [`AttestationFactory`] builds and signs attestations per witness type.

pub mod attestation;
pub mod canonical;
pub mod error;
pub mod factory;
pub mod schema;

pub use attestation::{Claims, WitnessAttestation};
pub use error::{AttestationError, SchemaViolation};
pub use factory::{AttestationFactory, AttestationOptions};
pub use schema::{check_claims, required_claims, ClaimKind, ClaimRequirement};
