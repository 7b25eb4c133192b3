//! # Contract Lifecycle Manager
//!
//! The top-level orchestrator. Owns the contract store and coordinates the
//! workflow engine, signature tracker, audit log, and number allocator.
//!
//! Cross-record consistency is application-level sequencing, not a
//! transaction: every signature event is followed by
//! [`ContractLifecycleManager::check_contract_completion`], which
//! re-derives contract and workflow status from the authoritative
//! signature set. The reconciliation is idempotent and re-runnable, so a
//! crash between related writes heals on the next event.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use consign_core::{Actor, ContractId, Geolocation, SignatureId, ValidationError};
use consign_state::{ContractStatus, SignatureType, WorkflowStep};

use crate::audit::{AuditLog, AuditLogEntry, ClientMeta};
use crate::contract::{ContractPatch, ContractRecord, NewContract};
use crate::error::EngineError;
use crate::sequence::ContractNumberAllocator;
use crate::signature::{SignatureRecord, SignatureTracker};
use crate::store::Store;
use crate::workflow::{SigningWorkflowEngine, WorkflowRecord};

use std::sync::Arc;

/// Body of a sign request: the opaque blob and optional coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// Opaque signature blob (e.g. a base64 image). Stored, not verified.
    pub signature_data: String,
    /// Coordinates captured at signing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
}

/// Orchestrates the contract lifecycle end to end.
#[derive(Debug, Clone, Default)]
pub struct ContractLifecycleManager {
    contracts: Store<ContractRecord>,
    workflows: SigningWorkflowEngine,
    signatures: SignatureTracker,
    audit: AuditLog,
    numbers: Arc<ContractNumberAllocator>,
}

impl ContractLifecycleManager {
    /// Create a manager with empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// The contract store, for hydration and persistence.
    pub fn contracts(&self) -> &Store<ContractRecord> {
        &self.contracts
    }

    /// The signing workflow engine.
    pub fn workflow_engine(&self) -> &SigningWorkflowEngine {
        &self.workflows
    }

    /// The signature tracker.
    pub fn signature_tracker(&self) -> &SignatureTracker {
        &self.signatures
    }

    /// The audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The contract number allocator, for hydration seeding.
    pub fn number_allocator(&self) -> &ContractNumberAllocator {
        &self.numbers
    }

    /// Create a contract in DRAFT together with its signing workflow.
    ///
    /// Validation happens before anything is persisted: at least two
    /// parties, and a signature order on every signing party when the
    /// contract is sequential.
    pub fn create_contract(
        &self,
        input: NewContract,
        actor: &Actor,
    ) -> Result<ContractRecord, EngineError> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "title" }.into());
        }
        if input.content.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "content" }.into());
        }
        if input.parties.len() < 2 {
            return Err(ValidationError::TooFewParties {
                count: input.parties.len(),
            }
            .into());
        }
        if input.is_sequential_signing {
            if let Some(unordered) = input
                .parties
                .iter()
                .find(|p| p.signature_required && p.signature_order.is_none())
            {
                return Err(ValidationError::MissingSignatureOrder {
                    party: unordered.name.clone(),
                }
                .into());
            }
        }

        let now = Utc::now();
        let contract_number = self.numbers.next(now.year());
        let parties: Vec<_> = input
            .parties
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.into_party(i + 1))
            .collect();

        let record = ContractRecord {
            id: ContractId::new(),
            contract_number,
            title: input.title,
            contract_type: input.contract_type,
            status: ContractStatus::Draft,
            template_id: input.template_id,
            parties,
            content: input.content,
            variables: input.variables,
            effective_date: input.effective_date,
            expiration_date: input.expiration_date,
            signing_workflow_id: None,
            is_sequential_signing: input.is_sequential_signing,
            files: input.files,
            final_document_url: None,
            created_by: actor.as_audit_str().to_string(),
            metadata: input.metadata,
            created_at: now,
            updated_at: now,
        };
        self.contracts.insert(*record.id.as_uuid(), record.clone());

        // One step per signing party; sequential order comes from the
        // parties, parallel workflows fall back to declaration order.
        let steps: Vec<WorkflowStep> = record
            .signing_parties()
            .enumerate()
            .map(|(i, p)| WorkflowStep {
                order: p.signature_order.unwrap_or(i as u32 + 1),
                party_id: p.id.clone(),
                party_name: p.name.clone(),
                party_email: p.email.clone(),
                status: consign_state::SignatureStatus::Pending,
                notified_at: None,
                completed_at: None,
            })
            .collect();

        let workflow = self.workflows.create_workflow(
            record.id,
            format!("Signing workflow for {}", record.title),
            record.is_sequential_signing,
            steps,
            input.reminder_interval_days,
            input.expiration_days,
        );

        let linked = self
            .contracts
            .update(record.id.as_uuid(), |c| {
                c.signing_workflow_id = Some(workflow.id);
                c.updated_at = Utc::now();
            })
            .ok_or_else(|| EngineError::not_found("contract", record.id))?;

        self.audit.append(
            linked.id,
            "CONTRACT_CREATED",
            actor,
            json!({
                "contractNumber": linked.contract_number,
                "title": linked.title,
                "partyCount": linked.parties.len(),
            }),
            &ClientMeta::default(),
        );
        tracing::info!(
            contract_id = %linked.id,
            contract_number = %linked.contract_number,
            workflow_id = %workflow.id,
            "contract created"
        );
        Ok(linked)
    }

    /// Dispatch a DRAFT contract for signing: the contract moves to
    /// PENDING_SIGNATURES, the workflow opens, and one pending signature
    /// request is materialized per signing party.
    pub fn send_for_signatures(
        &self,
        contract_id: ContractId,
        actor: &Actor,
    ) -> Result<ContractRecord, EngineError> {
        let updated = self
            .contracts
            .try_update(contract_id.as_uuid(), |c| {
                if c.status != ContractStatus::Draft {
                    return Err(EngineError::InvalidContractState {
                        action: "send",
                        status: c.status,
                    });
                }
                c.status = c.status.transition(ContractStatus::PendingSignatures)?;
                c.updated_at = Utc::now();
                Ok(c.clone())
            })
            .ok_or_else(|| EngineError::not_found("contract", contract_id))??;

        let workflow_id = updated
            .signing_workflow_id
            .ok_or_else(|| EngineError::not_found("workflow", contract_id))?;
        let workflow = self.workflows.start(workflow_id)?;

        let mut signer_count = 0usize;
        for party in updated.signing_parties() {
            let request = self.signatures.create_request(
                &updated,
                workflow_id,
                &party.email,
                SignatureType::Simple,
                workflow.expiration_days,
            )?;
            self.audit.append(
                updated.id,
                "SIGNATURE_REQUESTED",
                &Actor::System,
                json!({
                    "signerEmail": party.email,
                    "signatureId": request.id.to_string(),
                }),
                &ClientMeta::default(),
            );
            signer_count += 1;
        }

        self.audit.append(
            updated.id,
            "CONTRACT_SENT_FOR_SIGNATURES",
            actor,
            json!({ "signerCount": signer_count }),
            &ClientMeta::default(),
        );
        tracing::info!(
            contract_id = %updated.id,
            signer_count,
            "contract sent for signatures"
        );
        Ok(updated)
    }

    /// Apply a partial update. Rejected once the contract is FULLY_SIGNED
    /// or COMPLETED. The audit entry records changed field names only.
    pub fn update_contract(
        &self,
        contract_id: ContractId,
        patch: ContractPatch,
        actor: &Actor,
    ) -> Result<ContractRecord, EngineError> {
        let (updated, changed) = self
            .contracts
            .try_update(contract_id.as_uuid(), |c| {
                if matches!(
                    c.status,
                    ContractStatus::FullySigned | ContractStatus::Completed
                ) {
                    return Err(EngineError::InvalidContractState {
                        action: "update",
                        status: c.status,
                    });
                }
                let changed = patch.apply(c);
                if !changed.is_empty() {
                    c.updated_at = Utc::now();
                }
                Ok((c.clone(), changed))
            })
            .ok_or_else(|| EngineError::not_found("contract", contract_id))??;

        if !changed.is_empty() {
            self.audit.append(
                updated.id,
                "CONTRACT_UPDATED",
                actor,
                json!({ "changes": changed }),
                &ClientMeta::default(),
            );
        }
        Ok(updated)
    }

    /// Cancel a contract and its workflow. Rejected when already
    /// COMPLETED or CANCELLED.
    pub fn cancel_contract(
        &self,
        contract_id: ContractId,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<ContractRecord, EngineError> {
        let updated = self
            .contracts
            .try_update(contract_id.as_uuid(), |c| {
                if matches!(
                    c.status,
                    ContractStatus::Completed | ContractStatus::Cancelled
                ) {
                    return Err(EngineError::InvalidContractState {
                        action: "cancel",
                        status: c.status,
                    });
                }
                c.status = c.status.transition(ContractStatus::Cancelled)?;
                c.updated_at = Utc::now();
                Ok(c.clone())
            })
            .ok_or_else(|| EngineError::not_found("contract", contract_id))??;

        if let Some(workflow_id) = updated.signing_workflow_id {
            self.workflows.cancel(workflow_id)?;
        }

        self.audit.append(
            updated.id,
            "CONTRACT_CANCELLED",
            actor,
            json!({ "reason": reason }),
            &ClientMeta::default(),
        );
        tracing::info!(contract_id = %updated.id, "contract cancelled");
        Ok(updated)
    }

    /// Apply a signature to a pending request.
    ///
    /// For sequential contracts the attempt is rejected while any
    /// lower-ordered workflow step has not been signed. On success the
    /// matching step is marked, the step pointer advances, and contract
    /// status is reconciled from the full signature set.
    pub fn sign_document(
        &self,
        signature_id: SignatureId,
        request: SignRequest,
        meta: &ClientMeta,
        actor: &Actor,
    ) -> Result<SignatureRecord, EngineError> {
        let pending = self.signatures.get(signature_id)?;
        let contract = self.get_contract(pending.contract_id)?;

        if contract.is_sequential_signing {
            let workflow = self.workflows.get(pending.workflow_id)?;
            if workflow.pending_predecessors(&pending.signer_email) {
                return Err(EngineError::SequentialOrderViolation {
                    email: pending.signer_email,
                });
            }
        }

        let signed = self.signatures.sign(
            signature_id,
            request.signature_data,
            request.geolocation,
            meta,
        )?;
        self.workflows
            .record_step_signed(signed.workflow_id, &signed.signer_email)?;

        self.audit.append(
            signed.contract_id,
            "DOCUMENT_SIGNED",
            actor,
            json!({
                "signerEmail": signed.signer_email,
                "signatureType": signed.signature_type.as_str(),
            }),
            meta,
        );
        tracing::info!(
            signature_id = %signed.id,
            contract_id = %signed.contract_id,
            signer = %signed.signer_email,
            "document signed"
        );

        self.check_contract_completion(signed.contract_id)?;
        Ok(signed)
    }

    /// Decline a pending request. One decline is terminal for the whole
    /// contract: the contract and its workflow are cancelled
    /// unconditionally, and already-collected signatures are kept as
    /// evidence, not rolled back.
    pub fn decline_signature(
        &self,
        signature_id: SignatureId,
        reason: String,
        meta: &ClientMeta,
        actor: &Actor,
    ) -> Result<SignatureRecord, EngineError> {
        let declined = self.signatures.decline(signature_id, reason.clone(), meta)?;

        self.audit.append(
            declined.contract_id,
            "SIGNATURE_DECLINED",
            actor,
            json!({
                "signerEmail": declined.signer_email,
                "reason": reason,
            }),
            meta,
        );
        tracing::info!(
            signature_id = %declined.id,
            contract_id = %declined.contract_id,
            signer = %declined.signer_email,
            "signature declined"
        );

        // A second pending signer may decline after the first decline
        // already cancelled the contract; the decline itself still stands.
        match self.cancel_contract(
            declined.contract_id,
            Some(format!("signature declined by {}", declined.signer_email)),
            &Actor::System,
        ) {
            Ok(_) => {}
            Err(EngineError::InvalidContractState {
                status: ContractStatus::Cancelled,
                ..
            }) => {}
            Err(err) => return Err(err),
        }
        Ok(declined)
    }

    /// Re-derive contract and workflow status from the authoritative
    /// signature set. Idempotent: re-running after completion yields the
    /// same result, and it doubles as the repair procedure after a crash
    /// between related writes.
    pub fn check_contract_completion(
        &self,
        contract_id: ContractId,
    ) -> Result<ContractRecord, EngineError> {
        let contract = self.get_contract(contract_id)?;
        let signatures = self.signatures.list_for_contract(contract_id);
        if signatures.is_empty() {
            return Ok(contract);
        }

        let all_signed = signatures
            .iter()
            .all(|s| s.status == consign_state::SignatureStatus::Signed);
        let any_signed = signatures
            .iter()
            .any(|s| s.status == consign_state::SignatureStatus::Signed);

        if all_signed {
            let mut promoted = false;
            let updated = self
                .contracts
                .try_update(contract_id.as_uuid(), |c| {
                    if matches!(
                        c.status,
                        ContractStatus::PendingSignatures | ContractStatus::PartiallySigned
                    ) {
                        c.status = c.status.transition(ContractStatus::FullySigned)?;
                        c.updated_at = Utc::now();
                        promoted = true;
                    }
                    Ok::<_, EngineError>(c.clone())
                })
                .ok_or_else(|| EngineError::not_found("contract", contract_id))??;

            // Completing the workflow is idempotent, so the repair path
            // (contract already FULLY_SIGNED, workflow not yet closed)
            // converges here too.
            if updated.status == ContractStatus::FullySigned {
                if let Some(workflow_id) = updated.signing_workflow_id {
                    self.workflows.complete(workflow_id)?;
                }
            }
            if promoted {
                self.audit.append(
                    updated.id,
                    "CONTRACT_FULLY_SIGNED",
                    &Actor::System,
                    json!({ "signatureCount": signatures.len() }),
                    &ClientMeta::default(),
                );
                tracing::info!(contract_id = %updated.id, "contract fully signed");
            }
            Ok(updated)
        } else if any_signed {
            self.contracts
                .try_update(contract_id.as_uuid(), |c| {
                    if c.status == ContractStatus::PendingSignatures {
                        c.status = c.status.transition(ContractStatus::PartiallySigned)?;
                        c.updated_at = Utc::now();
                    }
                    Ok::<_, EngineError>(c.clone())
                })
                .ok_or_else(|| EngineError::not_found("contract", contract_id))?
        } else {
            Ok(contract)
        }
    }

    /// Fetch a contract.
    pub fn get_contract(&self, contract_id: ContractId) -> Result<ContractRecord, EngineError> {
        self.contracts
            .get(contract_id.as_uuid())
            .ok_or_else(|| EngineError::not_found("contract", contract_id))
    }

    /// Contracts created by a user, newest first.
    pub fn contracts_by_creator(&self, user_id: &str) -> Vec<ContractRecord> {
        let mut records: Vec<_> = self
            .contracts
            .list()
            .into_iter()
            .filter(|c| c.created_by == user_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Contracts where the given email is a declared party, newest first.
    pub fn contracts_by_party_email(&self, email: &str) -> Vec<ContractRecord> {
        let mut records: Vec<_> = self
            .contracts
            .list()
            .into_iter()
            .filter(|c| c.party_by_email(email).is_some())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// All signature requests for an existing contract.
    pub fn signatures_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Vec<SignatureRecord>, EngineError> {
        if !self.contracts.contains(contract_id.as_uuid()) {
            return Err(EngineError::not_found("contract", contract_id));
        }
        Ok(self.signatures.list_for_contract(contract_id))
    }

    /// The workflow owned by an existing contract.
    pub fn workflow_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<WorkflowRecord, EngineError> {
        if !self.contracts.contains(contract_id.as_uuid()) {
            return Err(EngineError::not_found("contract", contract_id));
        }
        self.workflows.get_by_contract(contract_id)
    }

    /// The audit trail for an existing contract, chronological.
    pub fn audit_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Vec<AuditLogEntry>, EngineError> {
        if !self.contracts.contains(contract_id.as_uuid()) {
            return Err(EngineError::not_found("contract", contract_id));
        }
        Ok(self.audit.for_contract(contract_id))
    }
}
