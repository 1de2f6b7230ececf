//! Ed25519 message signing and verification, behind the [`SignatureScheme`] seam.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use witness_types::{PrivateKey, PublicKey, Signature};

/// Signing capability supplied by the integrator.
///
/// Attestation creation calls [`sign`](SignatureScheme::sign) over the canonical
/// signing data; verification calls [`verify`](SignatureScheme::verify) with the
/// witness key held by the registry.
pub trait SignatureScheme: Send + Sync {
    /// Sign `message` with `private_key`.
    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Signature;

    /// Check `signature` over `message` against `public_key`.
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;

    /// Human-readable name of this scheme.
    fn name(&self) -> &str;
}

/// Ed25519 with strict verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Scheme;

impl SignatureScheme for Ed25519Scheme {
    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Signature {
        sign_message(message, private_key)
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        verify_signature(message, signature, public_key)
    }

    fn name(&self) -> &str {
        "ed25519"
    }
}

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Uses `verify_strict`, which rejects non-canonical signatures and weak
/// public keys. The final point comparison inside dalek is constant-time.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify_strict(message, &dalek_sig).is_ok()
}
