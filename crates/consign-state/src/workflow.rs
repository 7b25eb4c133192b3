//! # Signing Workflow Lifecycle
//!
//! The workflow coordinates signature collection for one contract:
//!
//! ```text
//! PENDING ──start()──▶ IN_PROGRESS ──▶ COMPLETED
//!    │                      │
//!    └──────────────────────┴────────▶ CANCELLED
//! ```
//!
//! Steps mirror the contract's signing parties, ordered by their signature
//! order (declaration order breaks ties for parallel signing).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consign_core::PartyId;

use crate::error::StateError;
use crate::signature::SignatureStatus;

/// Status of a signing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// Created alongside the contract; signing not yet opened.
    Pending,
    /// Collecting signatures.
    InProgress,
    /// Every step signed.
    Completed,
    /// Cancelled with its contract.
    Cancelled,
}

impl WorkflowStatus {
    /// Canonical state name as stored and audited.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether no further transitions may leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The legal targets from this state.
    pub fn valid_transitions(&self) -> &'static [WorkflowStatus] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Guarded transition. Returns the new state or a [`StateError`].
    pub fn transition(self, to: WorkflowStatus) -> Result<WorkflowStatus, StateError> {
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

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signing party's slot in the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Position in the signing order (1-based).
    pub order: u32,
    /// The party this step belongs to.
    pub party_id: PartyId,
    /// Party display name, denormalized for workflow views.
    pub party_name: String,
    /// Party email; signers are matched by this value.
    pub party_email: String,
    /// Current outcome of the step, mirroring the signature lifecycle.
    pub status: SignatureStatus,
    /// When the party was notified, if a notification went out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<DateTime<Utc>>,
    /// When the step reached SIGNED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowStep {
    /// Whether this step has been signed.
    pub fn is_signed(&self) -> bool {
        self.status == SignatureStatus::Signed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_happy_path() {
        let s = WorkflowStatus::Pending;
        let s = s.transition(WorkflowStatus::InProgress).unwrap();
        let s = s.transition(WorkflowStatus::Completed).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn cancel_from_pending_and_in_progress() {
        assert!(WorkflowStatus::Pending
            .transition(WorkflowStatus::Cancelled)
            .is_ok());
        assert!(WorkflowStatus::InProgress
            .transition(WorkflowStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn pending_cannot_complete_directly() {
        assert!(WorkflowStatus::Pending
            .transition(WorkflowStatus::Completed)
            .is_err());
    }

    #[test]
    fn step_wire_format() {
        let step = WorkflowStep {
            order: 1,
            party_id: PartyId::from_position(1),
            party_name: "Nordfracht GmbH".to_string(),
            party_email: "ops@nordfracht.example".to_string(),
            status: SignatureStatus::Pending,
            notified_at: None,
            completed_at: None,
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["partyId"], "party-1");
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("completedAt").is_none());
    }
}
