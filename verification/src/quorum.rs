//! Multi-witness quorum validation.
//!
//! A batch of attestations is accepted when enough of them verify and the
//! verified ones cover every required witness type. Every attestation in the
//! batch is evaluated; one bad attestation never hides the rest.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};
use witness_attestation::WitnessAttestation;
use witness_registry::RegistryError;
use witness_types::{Did, WitnessType};
use witness_utils::StatsCounter;

use crate::config::WitnessConfig;
use crate::error::{QuorumFailure, WitnessError};
use crate::verifier::AttestationVerifier;

const STAT_VERIFIED: &str = "verified";
const STAT_FAILED: &str = "failed";
const STAT_REPLAYED: &str = "replayed";
const STAT_QUORUM_ACCEPTED: &str = "quorum_accepted";
const STAT_QUORUM_REJECTED: &str = "quorum_rejected";

/// What a batch must satisfy. Built by the consuming policy layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WitnessRequirements {
    pub min_witnesses: usize,
    pub required_types: BTreeSet<WitnessType>,
    /// When set, verified attestations from other witnesses are demoted.
    pub allowed_witnesses: Option<BTreeSet<Did>>,
    /// When set, verified attestations from lower-reputation witnesses are demoted.
    pub min_reputation: Option<f64>,
    pub require_consensus: bool,
    /// Per `(entity, event_hash)` cap on consulted witnesses. Only enforced by
    /// [`QuorumValidator::validate_witnesses_for`].
    pub max_witness_attempts: Option<usize>,
}

impl WitnessRequirements {
    pub fn new(min_witnesses: usize) -> Self {
        Self {
            min_witnesses,
            ..Default::default()
        }
    }

    pub fn require_type(mut self, witness_type: WitnessType) -> Self {
        self.required_types.insert(witness_type);
        self
    }

    pub fn require_types(mut self, types: impl IntoIterator<Item = WitnessType>) -> Self {
        self.required_types.extend(types);
        self
    }

    pub fn allow_witnesses(mut self, witnesses: impl IntoIterator<Item = Did>) -> Self {
        self.allowed_witnesses = Some(witnesses.into_iter().collect());
        self
    }

    pub fn min_reputation(mut self, score: f64) -> Self {
        self.min_reputation = Some(score);
        self
    }

    pub fn require_consensus(mut self) -> Self {
        self.require_consensus = true;
        self
    }

    pub fn max_witness_attempts(mut self, attempts: usize) -> Self {
        self.max_witness_attempts = Some(attempts);
        self
    }
}

/// Outcome of [`QuorumValidator::validate_witnesses`].
///
/// The verified and failed lists are always complete, whatever `valid` says.
#[derive(Clone, Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub verified_attestations: Vec<WitnessAttestation>,
    pub failed_attestations: Vec<(WitnessAttestation, WitnessError)>,
    pub error: Option<QuorumFailure>,
    /// False whenever `valid` is false. With `require_consensus`, also false
    /// when verified attestations of one type disagree on a claim.
    pub consensus_achieved: bool,
}

impl ValidationResult {
    fn rejected(error: QuorumFailure) -> Self {
        Self {
            valid: false,
            verified_attestations: Vec::new(),
            failed_attestations: Vec::new(),
            error: Some(error),
            consensus_achieved: false,
        }
    }

    pub fn verified_types(&self) -> BTreeSet<WitnessType> {
        self.verified_attestations
            .iter()
            .map(|a| a.witness_type)
            .collect()
    }
}

pub struct QuorumValidator {
    verifier: AttestationVerifier,
    max_attestations: Option<usize>,
    track_reputation: bool,
    stats: StatsCounter,
}

impl QuorumValidator {
    pub fn new(verifier: AttestationVerifier) -> Self {
        let defaults = WitnessConfig::default();
        Self {
            verifier,
            max_attestations: defaults.max_attestations,
            track_reputation: defaults.track_reputation,
            stats: StatsCounter::new(&[
                STAT_VERIFIED,
                STAT_FAILED,
                STAT_REPLAYED,
                STAT_QUORUM_ACCEPTED,
                STAT_QUORUM_REJECTED,
            ]),
        }
    }

    /// Take the batch cap and reputation feedback from `config`.
    pub fn with_config(mut self, config: &WitnessConfig) -> Self {
        self.max_attestations = config.max_attestations;
        self.track_reputation = config.track_reputation;
        self
    }

    pub fn verifier(&self) -> &AttestationVerifier {
        &self.verifier
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    /// Validate a batch against `requirements`.
    ///
    /// `Err` only when the registry itself fails; every per-attestation
    /// problem lands in `failed_attestations`.
    pub fn validate_witnesses(
        &self,
        attestations: &[WitnessAttestation],
        requirements: &WitnessRequirements,
    ) -> Result<ValidationResult, RegistryError> {
        self.validate(attestations, requirements, None)
    }

    /// As [`validate_witnesses`](Self::validate_witnesses), also enforcing
    /// `requirements.max_witness_attempts` for `entity`.
    ///
    /// Each attestation carrying an `event_hash` counts as one witness
    /// consulted about that event. Once the cap is reached, further
    /// attestations for the event fail without being verified.
    pub fn validate_witnesses_for(
        &self,
        entity: &str,
        attestations: &[WitnessAttestation],
        requirements: &WitnessRequirements,
    ) -> Result<ValidationResult, RegistryError> {
        self.validate(attestations, requirements, Some(entity))
    }

    fn validate(
        &self,
        attestations: &[WitnessAttestation],
        requirements: &WitnessRequirements,
        entity: Option<&str>,
    ) -> Result<ValidationResult, RegistryError> {
        if let Some(max) = self.max_attestations {
            if attestations.len() > max {
                let failure = QuorumFailure::BatchTooLarge {
                    count: attestations.len(),
                    max,
                };
                warn!(%failure, "batch refused");
                self.stats.increment(STAT_QUORUM_REJECTED);
                return Ok(ValidationResult::rejected(failure));
            }
        }

        let mut verified = Vec::new();
        let mut failed = Vec::new();
        for att in attestations {
            match self.verify_one(att, requirements, entity) {
                Ok(()) => {
                    self.stats.increment(STAT_VERIFIED);
                    verified.push(att.clone());
                }
                Err(WitnessError::Registry(e)) => return Err(e),
                Err(e) => {
                    self.stats.increment(STAT_FAILED);
                    if matches!(e, WitnessError::ReplayedNonce(_)) {
                        self.stats.increment(STAT_REPLAYED);
                    }
                    failed.push((att.clone(), e));
                }
            }
        }

        // Feedback waits until after demotion so this batch cannot vouch for itself.
        let feedback: Vec<(Did, bool)> = if self.track_reputation {
            verified
                .iter()
                .map(|a| (a.witness_did.clone(), true))
                .chain(failed.iter().map(|(a, _)| (a.witness_did.clone(), false)))
                .collect()
        } else {
            Vec::new()
        };

        if let Some(allowed) = &requirements.allowed_witnesses {
            let (kept, demoted): (Vec<_>, Vec<_>) = verified
                .into_iter()
                .partition(|a: &WitnessAttestation| allowed.contains(&a.witness_did));
            verified = kept;
            for att in demoted {
                let err = WitnessError::NotWhitelisted(att.witness_did.clone());
                failed.push((att, err));
            }
        }

        if let Some(min) = requirements.min_reputation {
            let registry = self.verifier.registry();
            let mut kept = Vec::with_capacity(verified.len());
            for att in verified {
                let score = registry.get_reputation_score(&att.witness_did);
                if score < min {
                    let err = WitnessError::ReputationTooLow {
                        witness: att.witness_did.clone(),
                        score,
                        min,
                    };
                    failed.push((att, err));
                } else {
                    kept.push(att);
                }
            }
            verified = kept;
        }

        let registry = self.verifier.registry();
        for (did, success) in &feedback {
            if *success {
                registry.record_success(did);
            } else {
                registry.record_failure(did);
            }
        }

        let error = quorum_failure(&verified, requirements);
        let valid = error.is_none();
        let consensus_achieved = valid && (!requirements.require_consensus || claims_agree(&verified));

        if valid {
            self.stats.increment(STAT_QUORUM_ACCEPTED);
            info!(
                verified = verified.len(),
                failed = failed.len(),
                consensus_achieved,
                "quorum accepted"
            );
        } else {
            self.stats.increment(STAT_QUORUM_REJECTED);
            if let Some(failure) = &error {
                info!(
                    verified = verified.len(),
                    failed = failed.len(),
                    %failure,
                    "quorum rejected"
                );
            }
        }

        Ok(ValidationResult {
            valid,
            verified_attestations: verified,
            failed_attestations: failed,
            error,
            consensus_achieved,
        })
    }

    fn verify_one(
        &self,
        att: &WitnessAttestation,
        requirements: &WitnessRequirements,
        entity: Option<&str>,
    ) -> Result<(), WitnessError> {
        if let (Some(entity), Some(event_hash), Some(max)) = (
            entity,
            att.event_hash.as_deref(),
            requirements.max_witness_attempts,
        ) {
            let registry = self.verifier.registry();
            if let Err(attempts) =
                registry.try_record_witness_attempt(entity, event_hash, max)
            {
                return Err(WitnessError::WitnessShopping {
                    event_hash: event_hash.to_string(),
                    attempts,
                });
            }
        }
        self.verifier.verify_attestation(att)
    }
}

fn quorum_failure(
    verified: &[WitnessAttestation],
    requirements: &WitnessRequirements,
) -> Option<QuorumFailure> {
    if verified.len() < requirements.min_witnesses {
        return Some(QuorumFailure::InsufficientWitnesses {
            verified: verified.len(),
            required: requirements.min_witnesses,
        });
    }
    let present: BTreeSet<WitnessType> = verified.iter().map(|a| a.witness_type).collect();
    let missing: BTreeSet<WitnessType> = requirements
        .required_types
        .difference(&present)
        .copied()
        .collect();
    if !missing.is_empty() {
        return Some(QuorumFailure::MissingRequiredTypes { missing });
    }
    None
}

/// Attestations of the same type must repeat every claim of the first one.
fn claims_agree(verified: &[WitnessAttestation]) -> bool {
    let mut first_by_type: BTreeMap<WitnessType, &WitnessAttestation> = BTreeMap::new();
    for att in verified {
        let first = *first_by_type.entry(att.witness_type).or_insert(att);
        let agrees = first
            .claims
            .iter()
            .all(|(key, value)| att.claims.get(key) == Some(value));
        if !agrees {
            return false;
        }
    }
    true
}
