//! Cryptographic capability for witness attestations.
//!
//! - **Ed25519** for signing and strict signature verification
//! - **Blake2b** for fixed-size digests (nonce keys, event hashes)
//! - Random nonce generation
//!
//! The verifier only sees the [`SignatureScheme`] trait; [`Ed25519Scheme`] is
//! the default implementation.

pub mod hash;
pub mod keys;
pub mod nonce;
pub mod sign;

pub use hash::blake2b_256_multi;
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use nonce::generate_nonce;
pub use sign::{sign_message, verify_signature, Ed25519Scheme, SignatureScheme};
