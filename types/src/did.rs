//! Decentralized identifier naming a witness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A witness DID such as `did:web4:witness:alpha`.
///
/// Only `[A-Za-z0-9:_.-]` is accepted, with at most [`Did::MAX_LEN`] characters.
/// The restriction keeps identifiers safe to embed in log lines and error strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Longest accepted identifier.
    pub const MAX_LEN: usize = 256;

    /// Parse and validate a DID string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypeError::InvalidDid("identifier cannot be empty".into()));
        }
        if s.chars().count() > Self::MAX_LEN {
            return Err(TypeError::InvalidDid(format!(
                "identifier too long (max {} chars)",
                Self::MAX_LEN
            )));
        }
        if s.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidDid(
                "identifier contains control characters".into(),
            ));
        }
        if !s.chars().all(is_allowed_char) {
            return Err(TypeError::InvalidDid(
                "identifier contains invalid characters (allowed: a-zA-Z0-9:_.-)".into(),
            ));
        }
        Ok(Self(s))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-')
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_did() {
        let did = Did::parse("did:web4:witness:time-1").unwrap();
        assert_eq!(did.as_str(), "did:web4:witness:time-1");
        assert_eq!(did.to_string(), "did:web4:witness:time-1");
    }

    #[test]
    fn rejects_empty() {
        assert!(Did::parse("").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "a".repeat(Did::MAX_LEN + 1);
        assert!(Did::parse(long).is_err());
        let max = "a".repeat(Did::MAX_LEN);
        assert!(Did::parse(max).is_ok());
    }

    #[test]
    fn rejects_control_and_invalid_chars() {
        assert!(Did::parse("did:web4:\nx").is_err());
        assert!(Did::parse("did:web4:a b").is_err());
        assert!(Did::parse("did:web4:é").is_err());
        assert!(Did::parse("did/../etc").is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: Did = serde_json::from_str("\"did:x:1\"").unwrap();
        assert_eq!(ok.as_str(), "did:x:1");
        assert!(serde_json::from_str::<Did>("\"bad did\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"did:x:1\"");
    }
}
