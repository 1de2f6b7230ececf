//! Verifier configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use witness_registry::{NonceRetention, NonceScope, RegistryConfig};
use witness_utils::LogFormat;

use crate::error::ConfigError;

/// Configuration for a verifier deployment.
///
/// Can be loaded from a TOML file via [`WitnessConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WitnessConfig {
    /// Oldest acceptable attestation, in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// How far in the future a timestamp may be before it is rejected.
    #[serde(default = "default_future_skew_secs")]
    pub future_skew_secs: u64,

    /// Whether nonces are unique across all witnesses or per witness.
    #[serde(default)]
    pub nonce_scope: NonceScope,

    /// Forget consumed nonces after this many seconds. Unset keeps them forever.
    #[serde(default)]
    pub nonce_retention_secs: Option<u64>,

    /// Largest batch `validate_witnesses` will evaluate. Unset means no cap.
    #[serde(default)]
    pub max_attestations: Option<usize>,

    /// Feed each verification outcome back into witness reputation.
    #[serde(default)]
    pub track_reputation: bool,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter (e.g. "info", "debug,witness_verification=trace").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_max_age_secs() -> u64 {
    300
}

fn default_future_skew_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WitnessConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("WitnessConfig is always serializable to TOML")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attestations == Some(0) {
            return Err(ConfigError::Invalid(
                "max_attestations must be at least 1".into(),
            ));
        }
        if let Some(window) = self.nonce_retention_secs {
            let needed = self.max_age_secs.saturating_add(self.future_skew_secs);
            if window < needed {
                return Err(ConfigError::Invalid(format!(
                    "nonce_retention_secs ({window}) must cover max_age_secs + future_skew_secs ({needed})"
                )));
            }
        }
        Ok(())
    }

    /// Nonce policy for the registry this configuration drives.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            nonce_scope: self.nonce_scope,
            nonce_retention: match self.nonce_retention_secs {
                Some(secs) => NonceRetention::Window { secs },
                None => NonceRetention::Forever,
            },
        }
    }
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            future_skew_secs: default_future_skew_secs(),
            nonce_scope: NonceScope::default(),
            nonce_retention_secs: None,
            max_attestations: None,
            track_reputation: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
