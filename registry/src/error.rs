use thiserror::Error;

/// Failures of the registry itself, as opposed to rejections of an attestation.
///
/// These indicate a deployment or programming defect (an unreachable nonce
/// backend, say) and are never produced by adversarial input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("nonce store unavailable: {0}")]
    NonceStore(String),
}
