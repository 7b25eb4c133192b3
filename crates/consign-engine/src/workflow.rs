//! # Signing Workflow Engine
//!
//! One workflow per contract, derived from the parties marked as signers.
//! Step advancement is driven by signature events, not a scheduler: when a
//! signature lands, the engine marks the matching step and moves the step
//! pointer. Sequential gating itself lives in the lifecycle manager, which
//! consults [`WorkflowRecord::pending_predecessors`] before accepting a
//! sign attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consign_core::ContractId;
use consign_core::WorkflowId;
use consign_state::{SignatureStatus, WorkflowStatus, WorkflowStep};

use crate::error::EngineError;
use crate::store::Store;

/// Default days between signature reminders.
pub const DEFAULT_REMINDER_INTERVAL_DAYS: u32 = 3;
/// Default days until signature requests expire.
pub const DEFAULT_EXPIRATION_DAYS: u32 = 30;

/// A signing workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    /// Workflow identifier.
    pub id: WorkflowId,
    /// Owning contract (1:1).
    pub contract_id: ContractId,
    /// Workflow display name.
    pub name: String,
    /// Whether steps must complete in order.
    pub is_sequential: bool,
    /// 1-based pointer to the next expected step.
    pub current_step: u32,
    /// Number of signing parties at creation time.
    pub total_steps: u32,
    /// Steps, sorted by `order` ascending.
    pub steps: Vec<WorkflowStep>,
    /// Workflow lifecycle status.
    pub status: WorkflowStatus,
    /// When signing opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When every step reached SIGNED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the workflow was cancelled with its contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Days between signature reminders.
    pub reminder_interval_days: u32,
    /// Days until signature requests expire.
    pub expiration_days: u32,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRecord {
    /// Find the step belonging to a signer email.
    pub fn step_for_email(&self, email: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.party_email == email)
    }

    /// Whether any step ordered before this signer's step is not yet
    /// SIGNED. Sequential contracts reject a sign attempt while this
    /// holds.
    pub fn pending_predecessors(&self, email: &str) -> bool {
        let Some(step) = self.step_for_email(email) else {
            return false;
        };
        self.steps
            .iter()
            .any(|s| s.order < step.order && s.status != SignatureStatus::Signed)
    }
}

/// Creates workflows and advances their steps as signatures arrive.
#[derive(Debug, Clone, Default)]
pub struct SigningWorkflowEngine {
    workflows: Store<WorkflowRecord>,
}

impl SigningWorkflowEngine {
    /// Create an engine with an empty workflow store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the backing store, for hydration and persistence.
    pub fn store(&self) -> &Store<WorkflowRecord> {
        &self.workflows
    }

    /// Create a workflow for a contract. Steps are sorted by `order`
    /// ascending before persisting; the sort is stable, so declaration
    /// order breaks ties for parallel workflows.
    pub fn create_workflow(
        &self,
        contract_id: ContractId,
        name: impl Into<String>,
        is_sequential: bool,
        mut steps: Vec<WorkflowStep>,
        reminder_interval_days: Option<u32>,
        expiration_days: Option<u32>,
    ) -> WorkflowRecord {
        steps.sort_by_key(|s| s.order);
        let now = Utc::now();
        let record = WorkflowRecord {
            id: WorkflowId::new(),
            contract_id,
            name: name.into(),
            is_sequential,
            current_step: 1,
            total_steps: steps.len() as u32,
            steps,
            status: WorkflowStatus::Pending,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            reminder_interval_days: reminder_interval_days
                .unwrap_or(DEFAULT_REMINDER_INTERVAL_DAYS),
            expiration_days: expiration_days.unwrap_or(DEFAULT_EXPIRATION_DAYS),
            created_at: now,
            updated_at: now,
        };
        self.workflows.insert(*record.id.as_uuid(), record.clone());
        record
    }

    /// Fetch a workflow.
    pub fn get(&self, id: WorkflowId) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .get(id.as_uuid())
            .ok_or_else(|| EngineError::not_found("workflow", id))
    }

    /// Fetch the workflow owned by a contract.
    pub fn get_by_contract(&self, contract_id: ContractId) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .list()
            .into_iter()
            .find(|w| w.contract_id == contract_id)
            .ok_or_else(|| EngineError::not_found("workflow", contract_id))
    }

    /// Open the workflow for signing: PENDING → IN_PROGRESS with
    /// `started_at`.
    pub fn start(&self, id: WorkflowId) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .try_update(id.as_uuid(), |w| {
                w.status = w.status.transition(WorkflowStatus::InProgress)?;
                w.started_at = Some(Utc::now());
                w.updated_at = Utc::now();
                Ok::<_, EngineError>(w.clone())
            })
            .ok_or_else(|| EngineError::not_found("workflow", id))?
    }

    /// Mark the step for a signer email SIGNED and advance the step
    /// pointer.
    pub fn record_step_signed(
        &self,
        id: WorkflowId,
        party_email: &str,
    ) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .try_update(id.as_uuid(), |w| {
                let total = w.total_steps;
                let step = w
                    .steps
                    .iter_mut()
                    .find(|s| s.party_email == party_email)
                    .ok_or_else(|| EngineError::not_found("workflow step", party_email))?;
                step.status = SignatureStatus::Signed;
                step.completed_at = Some(Utc::now());
                w.current_step = (w.current_step + 1).min(total + 1);
                w.updated_at = Utc::now();
                Ok(w.clone())
            })
            .ok_or_else(|| EngineError::not_found("workflow", id))?
    }

    /// Close the workflow as COMPLETED. Idempotent when already completed.
    pub fn complete(&self, id: WorkflowId) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .try_update(id.as_uuid(), |w| {
                if w.status != WorkflowStatus::Completed {
                    w.status = w.status.transition(WorkflowStatus::Completed)?;
                    w.completed_at = Some(Utc::now());
                    w.updated_at = Utc::now();
                }
                Ok::<_, EngineError>(w.clone())
            })
            .ok_or_else(|| EngineError::not_found("workflow", id))?
    }

    /// Close the workflow as CANCELLED. Idempotent when already cancelled.
    pub fn cancel(&self, id: WorkflowId) -> Result<WorkflowRecord, EngineError> {
        self.workflows
            .try_update(id.as_uuid(), |w| {
                if w.status != WorkflowStatus::Cancelled {
                    w.status = w.status.transition(WorkflowStatus::Cancelled)?;
                    w.cancelled_at = Some(Utc::now());
                    w.updated_at = Utc::now();
                }
                Ok::<_, EngineError>(w.clone())
            })
            .ok_or_else(|| EngineError::not_found("workflow", id))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consign_core::PartyId;

    fn step(order: u32, email: &str) -> WorkflowStep {
        WorkflowStep {
            order,
            party_id: PartyId::from_position(order as usize),
            party_name: email.to_string(),
            party_email: email.to_string(),
            status: SignatureStatus::Pending,
            notified_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn steps_sorted_by_order_on_creation() {
        let engine = SigningWorkflowEngine::new();
        let wf = engine.create_workflow(
            ContractId::new(),
            "signing",
            true,
            vec![step(2, "b@x.com"), step(1, "a@x.com")],
            None,
            None,
        );
        assert_eq!(wf.steps[0].party_email, "a@x.com");
        assert_eq!(wf.current_step, 1);
        assert_eq!(wf.total_steps, 2);
        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert_eq!(wf.reminder_interval_days, DEFAULT_REMINDER_INTERVAL_DAYS);
        assert_eq!(wf.expiration_days, DEFAULT_EXPIRATION_DAYS);
    }

    #[test]
    fn start_sets_in_progress_once() {
        let engine = SigningWorkflowEngine::new();
        let wf = engine.create_workflow(
            ContractId::new(),
            "signing",
            false,
            vec![step(1, "a@x.com")],
            None,
            None,
        );
        let started = engine.start(wf.id).unwrap();
        assert_eq!(started.status, WorkflowStatus::InProgress);
        assert!(started.started_at.is_some());
        // a second start is an invalid transition
        assert!(engine.start(wf.id).is_err());
    }

    #[test]
    fn signing_a_step_advances_the_pointer() {
        let engine = SigningWorkflowEngine::new();
        let wf = engine.create_workflow(
            ContractId::new(),
            "signing",
            true,
            vec![step(1, "a@x.com"), step(2, "b@x.com")],
            None,
            None,
        );
        engine.start(wf.id).unwrap();
        let after = engine.record_step_signed(wf.id, "a@x.com").unwrap();
        assert_eq!(after.current_step, 2);
        assert!(after.steps[0].is_signed());
        assert!(after.steps[0].completed_at.is_some());
        assert!(!after.steps[1].is_signed());
    }

    #[test]
    fn pending_predecessors_gate() {
        let engine = SigningWorkflowEngine::new();
        let wf = engine.create_workflow(
            ContractId::new(),
            "signing",
            true,
            vec![step(1, "a@x.com"), step(2, "b@x.com")],
            None,
            None,
        );
        assert!(wf.pending_predecessors("b@x.com"));
        assert!(!wf.pending_predecessors("a@x.com"));

        engine.start(wf.id).unwrap();
        let after = engine.record_step_signed(wf.id, "a@x.com").unwrap();
        assert!(!after.pending_predecessors("b@x.com"));
    }

    #[test]
    fn complete_and_cancel_are_idempotent() {
        let engine = SigningWorkflowEngine::new();
        let wf = engine.create_workflow(
            ContractId::new(),
            "signing",
            false,
            vec![step(1, "a@x.com")],
            None,
            None,
        );
        engine.cancel(wf.id).unwrap();
        let again = engine.cancel(wf.id).unwrap();
        assert_eq!(again.status, WorkflowStatus::Cancelled);
        // but a cancelled workflow cannot complete
        assert!(engine.complete(wf.id).is_err());
    }

    #[test]
    fn get_by_contract_resolves_owner() {
        let engine = SigningWorkflowEngine::new();
        let contract = ContractId::new();
        let wf = engine.create_workflow(contract, "signing", false, Vec::new(), None, None);
        assert_eq!(engine.get_by_contract(contract).unwrap().id, wf.id);
        assert!(engine.get_by_contract(ContractId::new()).is_err());
    }
}
