//! The closed set of witness attestation types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Kind of fact a witness attests to.
///
/// The type decides which claim keys are mandatory and which capability a
/// witness must hold to issue it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WitnessType {
    /// Trusted timestamps and liveness.
    Time,
    /// Policy compliance validation with an evidence reference.
    Audit,
    /// Lightweight rate / digest checks.
    AuditMinimal,
    /// External data attestation.
    Oracle,
    /// Entity liveness proof.
    Existence,
    /// An operation occurred as described.
    Action,
    /// Status attestation.
    State,
    /// Performance metrics.
    Quality,
}

impl WitnessType {
    pub const ALL: [WitnessType; 8] = [
        WitnessType::Time,
        WitnessType::Audit,
        WitnessType::AuditMinimal,
        WitnessType::Oracle,
        WitnessType::Existence,
        WitnessType::Action,
        WitnessType::State,
        WitnessType::Quality,
    ];

    /// Wire string, e.g. `"audit-minimal"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WitnessType::Time => "time",
            WitnessType::Audit => "audit",
            WitnessType::AuditMinimal => "audit-minimal",
            WitnessType::Oracle => "oracle",
            WitnessType::Existence => "existence",
            WitnessType::Action => "action",
            WitnessType::State => "state",
            WitnessType::Quality => "quality",
        }
    }
}

impl fmt::Display for WitnessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WitnessType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WitnessType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeError::UnknownWitnessType(s.to_string()))
    }
}
