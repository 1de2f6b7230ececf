//! The witness registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use witness_types::{Clock, Did, PublicKey, SystemClock, Timestamp, WitnessType};

use crate::error::RegistryError;
use crate::nonce::{InMemoryNonceStore, NonceKey, NonceRetention, NonceScope, NonceStore};
use crate::shopping::AttemptTracker;

/// Reputation reported for a witness with no recorded outcomes.
pub const NEUTRAL_REPUTATION: f64 = 0.5;

/// Nonce policy for a registry instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub nonce_scope: NonceScope,
    pub nonce_retention: NonceRetention,
}

/// Everything the registry knows about one witness.
#[derive(Clone, Debug, PartialEq)]
pub struct WitnessEntry {
    pub public_key: PublicKey,
    pub capabilities: BTreeSet<WitnessType>,
    pub successes: u64,
    pub failures: u64,
    pub registered_at: Timestamp,
}

impl WitnessEntry {
    /// `successes / (successes + failures)`, or [`NEUTRAL_REPUTATION`] with no history.
    pub fn reputation(&self) -> f64 {
        let total = self.successes + self.failures;
        if total == 0 {
            NEUTRAL_REPUTATION
        } else {
            self.successes as f64 / total as f64
        }
    }
}

/// Known witnesses plus the nonce store.
///
/// Safe to share across threads. Entry reads clone the whole entry under a
/// read lock, so a reader never sees a key from one registration paired with
/// capabilities from another.
pub struct WitnessRegistry {
    witnesses: RwLock<HashMap<Did, WitnessEntry>>,
    nonces: Box<dyn NonceStore>,
    attempts: AttemptTracker,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl WitnessRegistry {
    /// Registry with global nonce scope, indefinite retention and the system clock.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_nonce_store(config, clock, Box::new(InMemoryNonceStore::new()))
    }

    /// Use an external nonce backend (e.g. a shared database).
    pub fn with_nonce_store(
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
        nonces: Box<dyn NonceStore>,
    ) -> Self {
        Self {
            witnesses: RwLock::new(HashMap::new()),
            nonces,
            attempts: AttemptTracker::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Did, WitnessEntry>> {
        self.witnesses.read().expect("witness registry lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Did, WitnessEntry>> {
        self.witnesses.write().expect("witness registry lock poisoned")
    }

    // ── Registration ───────────────────────────────────────────────────

    /// Register or replace a witness.
    ///
    /// Re-registering an existing DID overwrites its key and capabilities and
    /// starts its reputation over.
    pub fn register_witness(
        &self,
        did: Did,
        public_key: PublicKey,
        capabilities: impl IntoIterator<Item = WitnessType>,
    ) {
        let capabilities: BTreeSet<WitnessType> = capabilities.into_iter().collect();
        info!(
            witness = %did,
            capabilities = ?capabilities,
            "registering witness"
        );
        let entry = WitnessEntry {
            public_key,
            capabilities,
            successes: 0,
            failures: 0,
            registered_at: self.clock.now(),
        };
        self.write().insert(did, entry);
    }

    pub fn is_registered(&self, did: &Did) -> bool {
        self.read().contains_key(did)
    }

    /// Snapshot of a witness entry.
    pub fn witness(&self, did: &Did) -> Option<WitnessEntry> {
        self.read().get(did).cloned()
    }

    pub fn get_witness_public_key(&self, did: &Did) -> Option<PublicKey> {
        self.read().get(did).map(|e| e.public_key.clone())
    }

    /// Authorized witness types; empty for an unknown DID.
    pub fn get_witness_capabilities(&self, did: &Did) -> BTreeSet<WitnessType> {
        self.read()
            .get(did)
            .map(|e| e.capabilities.clone())
            .unwrap_or_default()
    }

    pub fn is_authorized(&self, did: &Did, witness_type: WitnessType) -> bool {
        self.read()
            .get(did)
            .is_some_and(|e| e.capabilities.contains(&witness_type))
    }

    pub fn witness_count(&self) -> usize {
        self.read().len()
    }

    // ── Reputation ─────────────────────────────────────────────────────

    /// Record a successful attestation. No effect for an unknown DID.
    pub fn record_success(&self, did: &Did) {
        if let Some(entry) = self.write().get_mut(did) {
            entry.successes = entry.successes.saturating_add(1);
        }
    }

    /// Record a failed attestation. No effect for an unknown DID.
    pub fn record_failure(&self, did: &Did) {
        if let Some(entry) = self.write().get_mut(did) {
            entry.failures = entry.failures.saturating_add(1);
        }
    }

    /// Success ratio in `[0, 1]`; [`NEUTRAL_REPUTATION`] for unknown witnesses
    /// and witnesses without history.
    pub fn get_reputation_score(&self, did: &Did) -> f64 {
        self.read()
            .get(did)
            .map_or(NEUTRAL_REPUTATION, WitnessEntry::reputation)
    }

    // ── Replay defense ─────────────────────────────────────────────────

    /// Atomically consume `nonce` for `witness`.
    ///
    /// `Ok(true)` the first time a (scoped) nonce is presented, `Ok(false)`
    /// on every later call. With [`NonceScope::Global`] the witness is ignored.
    /// `Err` only when the nonce backend itself fails.
    pub fn check_nonce(&self, witness: &Did, nonce: &str) -> Result<bool, RegistryError> {
        let now = self.clock.now();
        if let NonceRetention::Window { secs } = self.config.nonce_retention {
            let cutoff = now.offset_secs(-i64::try_from(secs).unwrap_or(i64::MAX));
            let purged = self.nonces.purge_before(cutoff)?;
            if purged > 0 {
                debug!(purged, "expired nonces compacted");
            }
        }
        let key = NonceKey::derive(self.config.nonce_scope, witness, nonce);
        let fresh = self.nonces.insert_if_absent(key, now)?;
        if !fresh {
            debug!(witness = %witness, nonce, "nonce replay refused");
        }
        Ok(fresh)
    }

    /// Number of nonces currently remembered.
    pub fn nonce_count(&self) -> Result<usize, RegistryError> {
        self.nonces.len()
    }

    // ── Witness shopping ───────────────────────────────────────────────

    /// Record that `entity` consulted another witness about `event_hash`,
    /// unless `max_attempts` has already been reached. See
    /// [`AttemptTracker::try_record`].
    pub fn try_record_witness_attempt(
        &self,
        entity: &str,
        event_hash: &str,
        max_attempts: usize,
    ) -> Result<usize, usize> {
        self.attempts.try_record(entity, event_hash, max_attempts)
    }

    pub fn witness_attempts(&self, entity: &str, event_hash: &str) -> usize {
        self.attempts.count(entity, event_hash)
    }
}

impl Default for WitnessRegistry {
    fn default() -> Self {
        Self::new()
    }
}
