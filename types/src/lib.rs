//! Fundamental types for the witness attestation workspace.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! witness identifiers, witness types, key material, and timestamps with an injectable clock.

pub mod did;
pub mod error;
pub mod keys;
pub mod time;
pub mod witness_type;

pub use did::Did;
pub use error::TypeError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::{Clock, SystemClock, Timestamp};
pub use witness_type::WitnessType;
