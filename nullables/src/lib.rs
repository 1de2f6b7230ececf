//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verifier (clock, signature scheme, nonce
//! backend) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record how they were called
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod scheme;
pub mod store;

pub use clock::NullClock;
pub use scheme::CountingScheme;
pub use store::FailingNonceStore;
