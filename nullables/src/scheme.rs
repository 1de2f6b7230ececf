//! Nullable signature scheme: real Ed25519, with call accounting.

use std::sync::atomic::{AtomicUsize, Ordering};
use witness_crypto::{Ed25519Scheme, SignatureScheme};
use witness_types::{PrivateKey, PublicKey, Signature};

/// Wraps [`Ed25519Scheme`] and counts calls.
///
/// Lets tests assert that a rejection happened before any signature work was
/// done (e.g. replays are refused without verifying).
#[derive(Debug, Default)]
pub struct CountingScheme {
    inner: Ed25519Scheme,
    signs: AtomicUsize,
    verifies: AtomicUsize,
}

impl CountingScheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_calls(&self) -> usize {
        self.signs.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }
}

impl SignatureScheme for CountingScheme {
    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Signature {
        self.signs.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(message, private_key)
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(public_key, message, signature)
    }

    fn name(&self) -> &str {
        "counting-ed25519"
    }
}
