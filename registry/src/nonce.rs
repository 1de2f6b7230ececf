//! Replay-defense nonce store.
//!
//! A nonce is accepted exactly once. The store exposes a single atomic
//! insert-if-absent operation and no separate `contains`,
//! so callers cannot build a read-then-write race on top of it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use witness_crypto::blake2b_256_multi;
use witness_types::{Did, Timestamp};

use crate::error::RegistryError;

/// Which attestations share a nonce space.
///
/// `Global` refuses a nonce reused by any witness. `PerWitness` isolates
/// witnesses from each other, so one witness cannot burn another's nonces,
/// but the same nonce then verifies once per witness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonceScope {
    /// A nonce is single-use across every witness.
    #[default]
    Global,
    /// A nonce is single-use per witness DID.
    PerWitness,
}

/// How long consumed nonces are remembered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonceRetention {
    /// Never forget a nonce.
    #[default]
    Forever,
    /// Forget nonces first seen more than this many seconds ago.
    ///
    /// Only safe when the window covers the whole freshness range
    /// (`max_age + future_skew`); the verifier clamps its age limit to it.
    Window { secs: u64 },
}

/// Fixed-size key a nonce is stored under (Blake2b-256 of the scoped nonce).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonceKey([u8; 32]);

impl NonceKey {
    /// Derive the storage key for `nonce` presented by `witness` under `scope`.
    ///
    /// Each scope uses its own domain tag, and DIDs cannot contain NUL, so
    /// keys from different scopes or witnesses never collide structurally.
    pub fn derive(scope: NonceScope, witness: &Did, nonce: &str) -> Self {
        let digest = match scope {
            NonceScope::Global => blake2b_256_multi(&[b"nonce/global".as_slice(), b"\0", nonce.as_bytes()]),
            NonceScope::PerWitness => blake2b_256_multi(&[
                b"nonce/witness".as_slice(),
                b"\0",
                witness.as_bytes(),
                b"\0",
                nonce.as_bytes(),
            ]),
        };
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Backend for consumed nonces.
///
/// Implementations must make [`insert_if_absent`](NonceStore::insert_if_absent)
/// linearizable: for any key, exactly one caller ever observes `Ok(true)`
/// (until the key is purged). A database backend would use a unique-constraint
/// insert.
pub trait NonceStore: Send + Sync {
    /// Record `key` as consumed. `Ok(true)` if it was new, `Ok(false)` if it was
    /// already present.
    fn insert_if_absent(&self, key: NonceKey, seen_at: Timestamp) -> Result<bool, RegistryError>;

    /// Forget every key first seen strictly before `cutoff`. Returns how many were removed.
    fn purge_before(&self, cutoff: Timestamp) -> Result<usize, RegistryError>;

    /// Number of keys currently remembered.
    fn len(&self) -> Result<usize, RegistryError>;
}

/// Mutex-guarded in-memory nonce set with a time index for purging.
#[derive(Debug, Default)]
pub struct InMemoryNonceStore {
    inner: Mutex<NonceSet>,
}

#[derive(Debug, Default)]
struct NonceSet {
    seen: HashMap<NonceKey, Timestamp>,
    /// Time index: first-seen instant -> keys. Lets purging touch only expired entries.
    by_time: BTreeMap<Timestamp, Vec<NonceKey>>,
}

impl InMemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NonceSet> {
        self.inner.lock().expect("nonce store lock poisoned")
    }
}

impl NonceStore for InMemoryNonceStore {
    fn insert_if_absent(&self, key: NonceKey, seen_at: Timestamp) -> Result<bool, RegistryError> {
        let mut set = self.lock();
        if set.seen.contains_key(&key) {
            return Ok(false);
        }
        set.seen.insert(key, seen_at);
        set.by_time.entry(seen_at).or_default().push(key);
        Ok(true)
    }

    fn purge_before(&self, cutoff: Timestamp) -> Result<usize, RegistryError> {
        let mut set = self.lock();
        let kept = set.by_time.split_off(&cutoff);
        let expired = std::mem::replace(&mut set.by_time, kept);
        let mut removed = 0;
        for key in expired.into_values().flatten() {
            if set.seen.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.lock().seen.len())
    }
}
