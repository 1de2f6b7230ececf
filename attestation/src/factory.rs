//! Attestation construction and signing.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use witness_crypto::{generate_nonce, Ed25519Scheme, SignatureScheme};
use witness_types::{Clock, Did, PrivateKey, Signature, SystemClock, WitnessType};

use crate::attestation::{Claims, WitnessAttestation};

/// Optional envelope fields for [`AttestationFactory::create_with`].
#[derive(Clone, Debug, Default)]
pub struct AttestationOptions {
    pub subject: Option<Did>,
    pub event_hash: Option<String>,
    pub policy: Option<String>,
    /// Envelope nonce. A fresh random one is drawn when unset.
    pub nonce: Option<String>,
}

impl AttestationOptions {
    pub fn subject(mut self, subject: Did) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn event_hash(mut self, event_hash: impl Into<String>) -> Self {
        self.event_hash = Some(event_hash.into());
        self
    }

    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// Builds signed attestations.
///
/// The timestamp comes from the injected clock, so tests can pin it.
pub struct AttestationFactory {
    scheme: Arc<dyn SignatureScheme>,
    clock: Arc<dyn Clock>,
}

impl AttestationFactory {
    pub fn new(scheme: Arc<dyn SignatureScheme>, clock: Arc<dyn Clock>) -> Self {
        Self { scheme, clock }
    }

    /// Ed25519 signatures, wall-clock timestamps.
    pub fn ed25519() -> Self {
        Self::new(Arc::new(Ed25519Scheme), Arc::new(SystemClock))
    }

    pub fn scheme(&self) -> &dyn SignatureScheme {
        self.scheme.as_ref()
    }

    /// Stamp, nonce and sign `claims` with no optional envelope fields.
    pub fn create_attestation(
        &self,
        witness_did: Did,
        witness_type: WitnessType,
        claims: Claims,
        private_key: &PrivateKey,
    ) -> WitnessAttestation {
        self.create_with(
            witness_did,
            witness_type,
            claims,
            private_key,
            AttestationOptions::default(),
        )
    }

    pub fn create_with(
        &self,
        witness_did: Did,
        witness_type: WitnessType,
        claims: Claims,
        private_key: &PrivateKey,
        options: AttestationOptions,
    ) -> WitnessAttestation {
        let mut attestation = WitnessAttestation {
            witness_did,
            witness_type,
            claims,
            signature: Signature([0; 64]),
            timestamp: self.clock.now(),
            nonce: options.nonce.unwrap_or_else(generate_nonce),
            subject: options.subject,
            event_hash: options.event_hash,
            policy: options.policy,
        };
        attestation.signature = self
            .scheme
            .sign(&attestation.to_signing_data(), private_key);
        debug!(
            witness = %attestation.witness_did,
            witness_type = %attestation.witness_type,
            nonce = %attestation.nonce,
            "attestation signed"
        );
        attestation
    }

    /// TIME: the witness's clock reading plus the caller's challenge nonce.
    pub fn time(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        challenge_nonce: &str,
        subject: Option<Did>,
    ) -> WitnessAttestation {
        let claims = claims([
            ("ts", json!(self.clock.now().to_iso8601())),
            ("nonce", json!(challenge_nonce)),
            // milliseconds
            ("accuracy", json!(100)),
        ]);
        let options = AttestationOptions {
            subject,
            ..Default::default()
        };
        self.create_with(witness_did, WitnessType::Time, claims, private_key, options)
    }

    /// AUDIT: whether a policy was met. Also sets the envelope `policy`.
    pub fn audit(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        policy_id: &str,
        policy_met: bool,
        evidence: &str,
        subject: Option<Did>,
    ) -> WitnessAttestation {
        let claims = claims([
            ("policy_id", json!(policy_id)),
            ("policy_met", json!(policy_met)),
            ("evidence", json!(evidence)),
        ]);
        let options = AttestationOptions {
            subject,
            policy: Some(policy_id.to_string()),
            ..Default::default()
        };
        self.create_with(witness_did, WitnessType::Audit, claims, private_key, options)
    }

    pub fn audit_minimal(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        digest_valid: bool,
        rate_ok: bool,
    ) -> WitnessAttestation {
        let claims = claims([
            ("digest_valid", json!(digest_valid)),
            ("rate_ok", json!(rate_ok)),
        ]);
        self.create_attestation(witness_did, WitnessType::AuditMinimal, claims, private_key)
    }

    pub fn action(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        action: &str,
        actor: &Did,
        outcome: &str,
        event_hash: Option<String>,
    ) -> WitnessAttestation {
        let claims = claims([
            ("action", json!(action)),
            ("actor", json!(actor.as_str())),
            ("outcome", json!(outcome)),
        ]);
        let options = AttestationOptions {
            event_hash,
            ..Default::default()
        };
        self.create_with(witness_did, WitnessType::Action, claims, private_key, options)
    }

    pub fn oracle(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        source: &str,
        data: Value,
    ) -> WitnessAttestation {
        let claims = claims([
            ("source", json!(source)),
            ("data", data),
            ("ts", json!(self.clock.now().to_iso8601())),
        ]);
        self.create_attestation(witness_did, WitnessType::Oracle, claims, private_key)
    }

    pub fn existence(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        subject: Did,
        method: &str,
    ) -> WitnessAttestation {
        let claims = claims([
            ("observed_at", json!(self.clock.now().to_iso8601())),
            ("method", json!(method)),
        ]);
        let options = AttestationOptions {
            subject: Some(subject),
            ..Default::default()
        };
        self.create_with(
            witness_did,
            WitnessType::Existence,
            claims,
            private_key,
            options,
        )
    }

    pub fn state(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        state: Value,
        measurement: Value,
    ) -> WitnessAttestation {
        let claims = claims([("state", state), ("measurement", measurement)]);
        self.create_attestation(witness_did, WitnessType::State, claims, private_key)
    }

    pub fn quality(
        &self,
        witness_did: Did,
        private_key: &PrivateKey,
        metric: &str,
        value: Value,
    ) -> WitnessAttestation {
        let claims = claims([("metric", json!(metric)), ("value", value)]);
        self.create_attestation(witness_did, WitnessType::Quality, claims, private_key)
    }
}

fn claims<const N: usize>(entries: [(&str, Value); N]) -> Claims {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
