//! # Contract Lifecycle
//!
//! ```text
//! DRAFT ──send()──▶ PENDING_SIGNATURES ──▶ PARTIALLY_SIGNED ──▶ FULLY_SIGNED ──▶ COMPLETED
//!   │                      │    │                  │
//!   │                      │    └──────────────────┴──▶ FULLY_SIGNED (all parties at once)
//!   └──────────────────────┴────────────────────────┬──▶ CANCELLED
//!                                                    └──▶ EXPIRED
//! ```
//!
//! `CANCELLED` and `EXPIRED` absorb from every pre-signature-complete state.
//! `COMPLETED`, `CANCELLED` and `EXPIRED` are terminal. The enum is the
//! single source of truth for the wire strings.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Being authored; parties and content may still change freely.
    Draft,
    /// Sent out; no signature collected yet.
    PendingSignatures,
    /// At least one, but not all, required signatures collected.
    PartiallySigned,
    /// Every required signature collected.
    FullySigned,
    /// Administratively closed after full signature.
    Completed,
    /// Withdrawn, or voided by a signer's decline.
    Cancelled,
    /// Signing window elapsed.
    Expired,
}

impl ContractStatus {
    /// Canonical state name as stored and audited.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingSignatures => "PENDING_SIGNATURES",
            Self::PartiallySigned => "PARTIALLY_SIGNED",
            Self::FullySigned => "FULLY_SIGNED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Whether no further transitions may leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// The legal targets from this state.
    pub fn valid_transitions(&self) -> &'static [ContractStatus] {
        match self {
            Self::Draft => &[
                Self::PendingSignatures,
                Self::Cancelled,
                Self::Expired,
            ],
            Self::PendingSignatures => &[
                Self::PartiallySigned,
                Self::FullySigned,
                Self::Cancelled,
                Self::Expired,
            ],
            Self::PartiallySigned => &[Self::FullySigned, Self::Cancelled, Self::Expired],
            Self::FullySigned => &[Self::Completed],
            Self::Completed | Self::Cancelled | Self::Expired => &[],
        }
    }

    /// Whether `to` is a legal target from this state.
    pub fn can_transition_to(&self, to: ContractStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Guarded transition. Returns the new state or a [`StateError`].
    pub fn transition(self, to: ContractStatus) -> Result<ContractStatus, StateError> {
        if self.is_terminal() {
            return Err(StateError::Terminal {
                state: self.as_str(),
            });
        }
        if !self.can_transition_to(to) {
            return Err(StateError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            });
        }
        Ok(to)
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let s = ContractStatus::Draft;
        let s = s.transition(ContractStatus::PendingSignatures).unwrap();
        let s = s.transition(ContractStatus::PartiallySigned).unwrap();
        let s = s.transition(ContractStatus::FullySigned).unwrap();
        let s = s.transition(ContractStatus::Completed).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn all_signers_at_once_skips_partial() {
        assert!(ContractStatus::PendingSignatures
            .transition(ContractStatus::FullySigned)
            .is_ok());
    }

    #[test]
    fn cancel_absorbs_from_pre_complete_states() {
        for from in [
            ContractStatus::Draft,
            ContractStatus::PendingSignatures,
            ContractStatus::PartiallySigned,
        ] {
            assert!(from.transition(ContractStatus::Cancelled).is_ok());
            assert!(from.transition(ContractStatus::Expired).is_ok());
        }
    }

    #[test]
    fn draft_cannot_jump_to_signed_states() {
        assert_eq!(
            ContractStatus::Draft.transition(ContractStatus::FullySigned),
            Err(StateError::InvalidTransition {
                from: "DRAFT",
                to: "FULLY_SIGNED",
            })
        );
    }

    #[test]
    fn fully_signed_cannot_be_cancelled() {
        assert!(ContractStatus::FullySigned
            .transition(ContractStatus::Cancelled)
            .is_err());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for state in [
            ContractStatus::Completed,
            ContractStatus::Cancelled,
            ContractStatus::Expired,
        ] {
            assert!(state.is_terminal());
            assert!(state.valid_transitions().is_empty());
            assert_eq!(
                state.transition(ContractStatus::Draft),
                Err(StateError::Terminal {
                    state: state.as_str(),
                })
            );
        }
    }

    #[test]
    fn wire_strings_are_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ContractStatus::PendingSignatures).unwrap(),
            "\"PENDING_SIGNATURES\""
        );
        let back: ContractStatus = serde_json::from_str("\"PARTIALLY_SIGNED\"").unwrap();
        assert_eq!(back, ContractStatus::PartiallySigned);
    }
}
