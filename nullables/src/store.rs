//! Nullable nonce store: a backend that is always down.

use witness_registry::{NonceKey, NonceStore, RegistryError};
use witness_types::Timestamp;

/// A nonce backend whose every call fails, for exercising the fatal path.
#[derive(Debug, Clone)]
pub struct FailingNonceStore {
    reason: String,
}

impl FailingNonceStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> RegistryError {
        RegistryError::NonceStore(self.reason.clone())
    }
}

impl NonceStore for FailingNonceStore {
    fn insert_if_absent(&self, _key: NonceKey, _seen_at: Timestamp) -> Result<bool, RegistryError> {
        Err(self.error())
    }

    fn purge_before(&self, _cutoff: Timestamp) -> Result<usize, RegistryError> {
        Err(self.error())
    }

    fn len(&self) -> Result<usize, RegistryError> {
        Err(self.error())
    }
}
