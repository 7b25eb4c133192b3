//! # Signature Request Lifecycle
//!
//! A signature request starts `PENDING` and moves exactly once, to one of
//! three terminal outcomes:
//!
//! ```text
//! PENDING ──sign()────▶ SIGNED
//!    │
//!    ├──decline()─────▶ DECLINED
//!    └──(window past)─▶ EXPIRED
//! ```
//!
//! Terminal signatures are immutable evidence and never change again.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Status of a single signature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureStatus {
    /// Awaiting the signer.
    Pending,
    /// Signed; carries the signature blob and capture metadata.
    Signed,
    /// Refused by the signer.
    Declined,
    /// The signing window elapsed before the signer acted.
    Expired,
}

impl SignatureStatus {
    /// Canonical state name as stored and audited.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Signed => "SIGNED",
            Self::Declined => "DECLINED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Whether this status is a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The legal targets from this state.
    pub fn valid_transitions(&self) -> &'static [SignatureStatus] {
        match self {
            Self::Pending => &[Self::Signed, Self::Declined, Self::Expired],
            Self::Signed | Self::Declined | Self::Expired => &[],
        }
    }

    /// Guarded transition. Returns the new state or a [`StateError`].
    pub fn transition(self, to: SignatureStatus) -> Result<SignatureStatus, StateError> {
        if self.is_terminal() {
            return Err(StateError::Terminal {
                state: self.as_str(),
            });
        }
        if !self.valid_transitions().contains(&to) {
            return Err(StateError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            });
        }
        Ok(to)
    }
}

impl std::fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assurance level of an electronic signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureType {
    /// Simple electronic signature.
    Simple,
    /// Advanced electronic signature.
    Advanced,
    /// Qualified electronic signature (certificate-backed).
    Qualified,
}

impl SignatureType {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "SIMPLE",
            Self::Advanced => "ADVANCED",
            Self::Qualified => "QUALIFIED",
        }
    }
}

impl std::fmt::Display for SignatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
