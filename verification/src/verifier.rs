//! Single-attestation verification.

use std::sync::Arc;

use tracing::{debug, warn};
use witness_attestation::{check_claims, WitnessAttestation};
use witness_crypto::{Ed25519Scheme, SignatureScheme};
use witness_registry::{NonceRetention, WitnessRegistry};
use witness_types::time::secs_to_micros;
use witness_types::{Clock, SystemClock};

use crate::config::WitnessConfig;
use crate::error::WitnessError;

/// Default oldest acceptable attestation age.
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

/// Default allowance for witness clocks running ahead of ours.
pub const DEFAULT_FUTURE_SKEW_SECS: u64 = 60;

const MICROS_PER_SEC: i64 = 1_000_000;

/// Verifies attestations against a shared [`WitnessRegistry`].
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. the witness is registered
/// 2. it is authorized for the attestation's type
/// 3. the timestamp is inside the freshness window
/// 4. the nonce has not been seen before (consumed here, whatever follows)
/// 5. the claims satisfy the type's schema
/// 6. the signature verifies against the registered key
///
/// Replays are refused before any signature work is done.
pub struct AttestationVerifier {
    registry: Arc<WitnessRegistry>,
    scheme: Arc<dyn SignatureScheme>,
    clock: Arc<dyn Clock>,
    max_age_secs: u64,
    future_skew_secs: u64,
}

impl AttestationVerifier {
    pub fn new(
        registry: Arc<WitnessRegistry>,
        scheme: Arc<dyn SignatureScheme>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            scheme,
            clock,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            future_skew_secs: DEFAULT_FUTURE_SKEW_SECS,
        }
    }

    /// Ed25519 verification against the system clock.
    pub fn ed25519(registry: Arc<WitnessRegistry>) -> Self {
        Self::new(registry, Arc::new(Ed25519Scheme), Arc::new(SystemClock))
    }

    /// Take the freshness window from `config`.
    pub fn with_config(mut self, config: &WitnessConfig) -> Self {
        self.max_age_secs = config.max_age_secs;
        self.future_skew_secs = config.future_skew_secs;
        self
    }

    pub fn registry(&self) -> &Arc<WitnessRegistry> {
        &self.registry
    }

    pub fn scheme(&self) -> &dyn SignatureScheme {
        self.scheme.as_ref()
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Verify with the configured maximum age.
    pub fn verify_attestation(&self, attestation: &WitnessAttestation) -> Result<(), WitnessError> {
        self.verify_attestation_with_max_age(attestation, self.max_age_secs)
    }

    /// Verify, accepting attestations up to `max_age_secs` old.
    ///
    /// When the registry forgets nonces after a window, the age limit is
    /// clamped to `window - future_skew` so no attestation can outlive the
    /// record of its nonce.
    pub fn verify_attestation_with_max_age(
        &self,
        attestation: &WitnessAttestation,
        max_age_secs: u64,
    ) -> Result<(), WitnessError> {
        let max_age_secs = self.effective_max_age(max_age_secs);
        let result = self.check(attestation, max_age_secs);
        match &result {
            Ok(()) => debug!(
                witness = %attestation.witness_did,
                witness_type = %attestation.witness_type,
                "attestation verified"
            ),
            Err(e) => warn!(
                witness = %attestation.witness_did,
                witness_type = %attestation.witness_type,
                reason = %e,
                "attestation rejected"
            ),
        }
        result
    }

    fn effective_max_age(&self, requested: u64) -> u64 {
        let NonceRetention::Window { secs } = self.registry.config().nonce_retention else {
            return requested;
        };
        let limit = secs.saturating_sub(self.future_skew_secs);
        if requested > limit {
            warn!(
                requested,
                limit,
                retention_secs = secs,
                "max age exceeds nonce retention window, clamping"
            );
            limit
        } else {
            requested
        }
    }

    fn check(&self, att: &WitnessAttestation, max_age_secs: u64) -> Result<(), WitnessError> {
        // One snapshot serves steps 1, 2 and 6.
        let entry = self
            .registry
            .witness(&att.witness_did)
            .ok_or_else(|| WitnessError::UnknownWitness(att.witness_did.clone()))?;

        if !entry.capabilities.contains(&att.witness_type) {
            return Err(WitnessError::UnauthorizedType {
                witness: att.witness_did.clone(),
                witness_type: att.witness_type,
            });
        }

        let age = self.clock.now().micros_since(att.timestamp);
        if age > secs_to_micros(max_age_secs) {
            return Err(WitnessError::TooOld {
                age_secs: age / MICROS_PER_SEC,
                max_age_secs,
            });
        }
        if age < -secs_to_micros(self.future_skew_secs) {
            return Err(WitnessError::FromFuture {
                ahead_secs: -age / MICROS_PER_SEC,
                skew_secs: self.future_skew_secs,
            });
        }

        if !self.registry.check_nonce(&att.witness_did, &att.nonce)? {
            return Err(WitnessError::ReplayedNonce(att.nonce.clone()));
        }

        check_claims(att.witness_type, &att.claims)?;

        let message = att.to_signing_data();
        if !self.scheme.verify(&entry.public_key, &message, &att.signature) {
            return Err(WitnessError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use witness_attestation::{AttestationFactory, Claims};
    use witness_crypto::keypair_from_seed;
    use witness_nullables::{CountingScheme, NullClock};
    use witness_registry::{NonceScope, RegistryConfig};
    use witness_types::{Did, KeyPair, WitnessType};

    const NOW: i64 = 1_764_928_800;

    struct Fixture {
        clock: Arc<NullClock>,
        registry: Arc<WitnessRegistry>,
        scheme: Arc<CountingScheme>,
        verifier: AttestationVerifier,
        factory: AttestationFactory,
        did: Did,
        keys: KeyPair,
    }

    fn fixture_with(config: RegistryConfig) -> Fixture {
        let clock = Arc::new(NullClock::at_secs(NOW));
        let registry = Arc::new(WitnessRegistry::with_config(config, clock.clone()));
        let scheme = Arc::new(CountingScheme::new());
        let verifier = AttestationVerifier::new(registry.clone(), scheme.clone(), clock.clone());
        let factory = AttestationFactory::new(Arc::new(Ed25519Scheme), clock.clone());
        let did = Did::parse("did:web4:witness:w1").unwrap();
        let keys = keypair_from_seed(&[1; 32]);
        registry.register_witness(
            did.clone(),
            keys.public.clone(),
            [WitnessType::Time, WitnessType::Audit],
        );
        Fixture {
            clock,
            registry,
            scheme,
            verifier,
            factory,
            did,
            keys,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RegistryConfig::default())
    }

    impl Fixture {
        fn time_att(&self) -> WitnessAttestation {
            self.factory.time(self.did.clone(), &self.keys.private, "c", None)
        }
    }

    #[test]
    fn accepts_a_valid_attestation() {
        let f = fixture();
        assert_eq!(f.verifier.verify_attestation(&f.time_att()), Ok(()));
        assert_eq!(f.scheme.verify_calls(), 1);
    }

    #[test]
    fn unknown_witness_is_rejected_first() {
        let f = fixture();
        let mut att = f.time_att();
        att.witness_did = Did::parse("did:web4:witness:ghost").unwrap();
        let err = f.verifier.verify_attestation(&att).unwrap_err();
        assert!(matches!(err, WitnessError::UnknownWitness(_)));
        assert_eq!(f.registry.nonce_count().unwrap(), 0);
    }

    #[test]
    fn unauthorized_type_is_rejected_before_the_nonce_is_consumed() {
        let f = fixture();
        let att = f
            .factory
            .oracle(f.did.clone(), &f.keys.private, "feed", json!(1));
        let err = f.verifier.verify_attestation(&att).unwrap_err();
        assert_eq!(err.to_string(), "oracle not authorized for did:web4:witness:w1");
        assert_eq!(f.registry.nonce_count().unwrap(), 0);
    }

    #[test]
    fn freshness_boundaries() {
        let f = fixture();

        let at_limit = f.time_att();
        f.clock.advance_secs(300);
        assert_eq!(f.verifier.verify_attestation(&at_limit), Ok(()));

        let stale = f.time_att();
        f.clock.advance_secs(301);
        let err = f.verifier.verify_attestation(&stale).unwrap_err();
        assert!(err.to_string().contains("too old"));

        let ahead = f.time_att();
        f.clock.advance_secs(-60);
        assert_eq!(f.verifier.verify_attestation(&ahead), Ok(()));

        let far_ahead = f.time_att();
        f.clock.advance_secs(-61);
        let err = f.verifier.verify_attestation(&far_ahead).unwrap_err();
        assert!(err.to_string().contains("from future"));
    }

    #[test]
    fn stale_attestations_keep_their_nonce_unconsumed() {
        let f = fixture();
        let att = f.time_att();
        f.clock.advance_secs(1_000);
        assert!(f.verifier.verify_attestation(&att).unwrap_err().is_stale());
        assert_eq!(f.registry.nonce_count().unwrap(), 0);
    }

    #[test]
    fn explicit_max_age_overrides_the_default() {
        let f = fixture();
        let att = f.time_att();
        f.clock.advance_secs(30);
        let err = f
            .verifier
            .verify_attestation_with_max_age(&att, 10)
            .unwrap_err();
        assert!(matches!(err, WitnessError::TooOld { age_secs: 30, max_age_secs: 10 }));
    }

    #[test]
    fn replay_is_refused_without_signature_work() {
        let f = fixture();
        let att = f.time_att();
        assert_eq!(f.verifier.verify_attestation(&att), Ok(()));
        let err = f.verifier.verify_attestation(&att).unwrap_err();
        assert_eq!(err, WitnessError::ReplayedNonce(att.nonce.clone()));
        assert_eq!(f.scheme.verify_calls(), 1);
    }

    #[test]
    fn nonce_is_consumed_even_when_the_signature_fails() {
        let f = fixture();
        let mut att = f.time_att();
        att.claims.insert("accuracy".into(), json!(1));
        assert_eq!(
            f.verifier.verify_attestation(&att),
            Err(WitnessError::InvalidSignature)
        );
        // Retrying the same nonce with a repaired body is still a replay.
        let mut retry = f.time_att();
        retry.nonce = att.nonce.clone();
        assert!(matches!(
            f.verifier.verify_attestation(&retry),
            Err(WitnessError::ReplayedNonce(_))
        ));
    }

    #[test]
    fn schema_violation_is_reported_before_the_signature() {
        let f = fixture();
        let mut claims = Claims::new();
        claims.insert("policy_id".into(), json!("p"));
        claims.insert("policy_met".into(), json!(true));
        let att = f
            .factory
            .create_attestation(f.did.clone(), WitnessType::Audit, claims, &f.keys.private);
        let err = f.verifier.verify_attestation(&att).unwrap_err();
        assert!(err.to_string().contains("missing 'evidence'"));
        assert_eq!(f.scheme.verify_calls(), 0);
    }

    #[test]
    fn retention_window_clamps_max_age() {
        let f = fixture_with(RegistryConfig {
            nonce_scope: NonceScope::Global,
            nonce_retention: NonceRetention::Window { secs: 200 },
        });
        let att = f.time_att();
        f.clock.advance_secs(150);
        let err = f.verifier.verify_attestation(&att).unwrap_err();
        assert!(matches!(err, WitnessError::TooOld { max_age_secs: 140, .. }));
    }

    #[test]
    fn with_config_sets_the_window() {
        let f = fixture();
        let config = WitnessConfig {
            max_age_secs: 5,
            ..WitnessConfig::default()
        };
        let verifier =
            AttestationVerifier::new(f.registry.clone(), f.scheme.clone(), f.clock.clone())
                .with_config(&config);
        assert_eq!(verifier.max_age_secs(), 5);
        let att = f.time_att();
        f.clock.advance_secs(6);
        assert!(verifier.verify_attestation(&att).unwrap_err().is_stale());
    }
}
