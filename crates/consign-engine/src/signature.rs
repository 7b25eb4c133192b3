//! # Signature Tracker
//!
//! Per-signer signature request lifecycle. Requests are created when a
//! contract is sent for signatures, then each moves exactly once to
//! SIGNED, DECLINED, or EXPIRED.
//!
//! Expiration is lazy: there is no timer. An expired request is detected
//! at the moment a sign attempt is made, the EXPIRED transition is
//! persisted, and the attempt fails. The persisted expiry survives the
//! failed call by design — `Store::try_update` keeps mutations made
//! before an `Err` return.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use consign_core::{ContractId, Geolocation, PartyId, SignatureId, WorkflowId};
use consign_state::{SignatureStatus, SignatureType};

use crate::audit::ClientMeta;
use crate::contract::ContractRecord;
use crate::error::EngineError;
use crate::store::Store;

/// A per-signer signature request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    /// Signature request identifier.
    pub id: SignatureId,
    /// Owning contract.
    pub contract_id: ContractId,
    /// The contract's signing workflow.
    pub workflow_id: WorkflowId,
    /// The signing party's contract-local id.
    pub signer_id: PartyId,
    /// Signer display name.
    pub signer_name: String,
    /// Signer email; the identity key for signing.
    pub signer_email: String,
    /// Request lifecycle status.
    pub status: SignatureStatus,
    /// Assurance level requested.
    #[serde(rename = "type")]
    pub signature_type: SignatureType,
    /// When the request was signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    /// When the request was declined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_at: Option<DateTime<Utc>>,
    /// The signer's stated reason for declining.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    /// Opaque signature blob, set on signing. Not verified here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<String>,
    /// Client IP at signing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent at signing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Coordinates captured at signing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
    /// Certificate reference for qualified signatures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// When the latest reminder went out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_sent_at: Option<DateTime<Utc>>,
    /// End of the signing window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Tracks signature requests across all contracts.
#[derive(Debug, Clone, Default)]
pub struct SignatureTracker {
    signatures: Store<SignatureRecord>,
}

impl SignatureTracker {
    /// Create a tracker with an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the backing store, for hydration and persistence.
    pub fn store(&self) -> &Store<SignatureRecord> {
        &self.signatures
    }

    /// Create a pending signature request for one of the contract's
    /// parties.
    ///
    /// Fails with NotFound if the email is not a declared party, and with
    /// a duplicate-request error if any request already exists for this
    /// (contract, email) pair. The duplicate check is read-then-write; a
    /// unique index on (contract_id, signer_email) backs it when a
    /// database is configured.
    pub fn create_request(
        &self,
        contract: &ContractRecord,
        workflow_id: WorkflowId,
        signer_email: &str,
        signature_type: SignatureType,
        expiration_days: u32,
    ) -> Result<SignatureRecord, EngineError> {
        let party = contract
            .party_by_email(signer_email)
            .ok_or_else(|| EngineError::not_found("party", signer_email))?;

        let duplicate = self
            .signatures
            .list()
            .into_iter()
            .any(|s| s.contract_id == contract.id && s.signer_email == signer_email);
        if duplicate {
            return Err(EngineError::DuplicateSignatureRequest {
                contract_id: contract.id,
                email: signer_email.to_string(),
            });
        }

        let now = Utc::now();
        let record = SignatureRecord {
            id: SignatureId::new(),
            contract_id: contract.id,
            workflow_id,
            signer_id: party.id.clone(),
            signer_name: party.name.clone(),
            signer_email: signer_email.to_string(),
            status: SignatureStatus::Pending,
            signature_type,
            signed_at: None,
            declined_at: None,
            decline_reason: None,
            signature_data: None,
            ip_address: None,
            user_agent: None,
            geolocation: None,
            certificate: None,
            reminder_sent_at: None,
            expires_at: Some(now + Duration::days(i64::from(expiration_days))),
            created_at: now,
            updated_at: now,
        };
        self.signatures.insert(*record.id.as_uuid(), record.clone());
        Ok(record)
    }

    /// Fetch a signature request.
    pub fn get(&self, id: SignatureId) -> Result<SignatureRecord, EngineError> {
        self.signatures
            .get(id.as_uuid())
            .ok_or_else(|| EngineError::not_found("signature", id))
    }

    /// All signature requests for a contract, oldest first.
    pub fn list_for_contract(&self, contract_id: ContractId) -> Vec<SignatureRecord> {
        let mut records: Vec<_> = self
            .signatures
            .list()
            .into_iter()
            .filter(|s| s.contract_id == contract_id)
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        records
    }

    /// Apply a signature to a pending request.
    ///
    /// If the signing window has passed, the request is moved to EXPIRED
    /// and the call fails with [`EngineError::SignatureExpired`]; the
    /// expiry is persisted even though the call fails.
    pub fn sign(
        &self,
        id: SignatureId,
        signature_data: String,
        geolocation: Option<Geolocation>,
        meta: &ClientMeta,
    ) -> Result<SignatureRecord, EngineError> {
        self.signatures
            .try_update(id.as_uuid(), |s| {
                if s.status != SignatureStatus::Pending {
                    return Err(EngineError::SignatureNotPending {
                        id,
                        status: s.status,
                    });
                }
                let now = Utc::now();
                if let Some(expires_at) = s.expires_at {
                    if expires_at < now {
                        s.status = s.status.transition(SignatureStatus::Expired)?;
                        s.updated_at = now;
                        return Err(EngineError::SignatureExpired {
                            id,
                            expired_at: expires_at,
                        });
                    }
                }
                s.status = s.status.transition(SignatureStatus::Signed)?;
                s.signed_at = Some(now);
                s.signature_data = Some(signature_data);
                s.ip_address = meta.ip_address.clone();
                s.user_agent = meta.user_agent.clone();
                s.geolocation = geolocation;
                s.updated_at = now;
                Ok(s.clone())
            })
            .ok_or_else(|| EngineError::not_found("signature", id))?
    }

    /// Decline a pending request.
    pub fn decline(
        &self,
        id: SignatureId,
        reason: String,
        meta: &ClientMeta,
    ) -> Result<SignatureRecord, EngineError> {
        self.signatures
            .try_update(id.as_uuid(), |s| {
                if s.status != SignatureStatus::Pending {
                    return Err(EngineError::SignatureNotPending {
                        id,
                        status: s.status,
                    });
                }
                let now = Utc::now();
                s.status = s.status.transition(SignatureStatus::Declined)?;
                s.declined_at = Some(now);
                s.decline_reason = Some(reason);
                s.ip_address = meta.ip_address.clone();
                s.user_agent = meta.user_agent.clone();
                s.updated_at = now;
                Ok(s.clone())
            })
            .ok_or_else(|| EngineError::not_found("signature", id))?
    }
}
