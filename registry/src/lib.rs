//! Registry of known witnesses and the replay-defense nonce store.
//!
//! The registry is the only mutable shared state in the attestation pipeline.
//! It is an explicit value, shared behind an `Arc`, never a process-wide global.
//!
//! - [`WitnessRegistry`] holds public keys, authorized witness types and
//!   reputation counters per witness DID.
//! - [`NonceStore`] is the atomic test-and-set primitive that makes every
//!   nonce single-use. [`InMemoryNonceStore`] is the default backend; a
//!   shared database with a unique constraint can stand in for it.

pub mod error;
pub mod nonce;
pub mod registry;
pub mod shopping;

pub use error::RegistryError;
pub use nonce::{InMemoryNonceStore, NonceKey, NonceRetention, NonceScope, NonceStore};
pub use registry::{RegistryConfig, WitnessEntry, WitnessRegistry, NEUTRAL_REPUTATION};
pub use shopping::AttemptTracker;
