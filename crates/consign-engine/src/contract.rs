//! # Contract Records
//!
//! The contract document, its creation input, and the partial-update patch.
//! Party ids are assigned here (`party-1`, `party-2`, ...) so callers never
//! invent them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consign_core::{
    CompanyDetails, ContractFile, ContractId, ContractType, Party, PartyId, PartyRole, PartyType,
    TemplateId, WorkflowId,
};
use consign_state::ContractStatus;

/// A contract document with its embedded party list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    /// Contract identifier.
    pub id: ContractId,
    /// Human-readable number, `CTR-{year}-{seq:06}`.
    pub contract_number: String,
    /// Contract title.
    pub title: String,
    /// Kind of agreement.
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    /// Lifecycle status.
    pub status: ContractStatus,
    /// Template this contract was instantiated from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    /// The parties to the agreement. At least two, assigned ids in
    /// declaration order.
    pub parties: Vec<Party>,
    /// Final contract content.
    pub content: String,
    /// Filled template variables, if instantiated from a template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
    /// When the agreement takes effect.
    pub effective_date: DateTime<Utc>,
    /// When the agreement lapses, if bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Back-reference to the contract's signing workflow, written once at
    /// creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_workflow_id: Option<WorkflowId>,
    /// Whether signing parties must sign in `signature_order`.
    pub is_sequential_signing: bool,
    /// Attached files.
    pub files: Vec<ContractFile>,
    /// URL of the final signed document, once rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_document_url: Option<String>,
    /// Creator's user id (audit string).
    pub created_by: String,
    /// Caller-supplied metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl ContractRecord {
    /// Parties that must sign, in declaration order.
    pub fn signing_parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.iter().filter(|p| p.is_signer())
    }

    /// Find a party by email.
    pub fn party_by_email(&self, email: &str) -> Option<&Party> {
        self.parties.iter().find(|p| p.email == email)
    }
}

/// A party as supplied at contract creation, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInput {
    /// Individual or company.
    #[serde(rename = "type")]
    pub party_type: PartyType,
    /// Display name.
    pub name: String,
    /// Contact and signer-matching email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Company details for company parties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyDetails>,
    /// Role in the exchange.
    pub role: PartyRole,
    /// Whether this party must sign.
    pub signature_required: bool,
    /// Position in the sequential signing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_order: Option<u32>,
}

impl PartyInput {
    /// Assign a contract-local id from the party's 1-based position.
    pub fn into_party(self, position: usize) -> Party {
        Party {
            id: PartyId::from_position(position),
            party_type: self.party_type,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            role: self.role,
            signature_required: self.signature_required,
            signature_order: self.signature_order,
        }
    }
}

/// Input for creating a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    /// Contract title.
    pub title: String,
    /// Kind of agreement.
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    /// Template to instantiate from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    /// The parties, in declaration order.
    pub parties: Vec<PartyInput>,
    /// Final contract content.
    pub content: String,
    /// Filled template variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
    /// When the agreement takes effect.
    pub effective_date: DateTime<Utc>,
    /// When the agreement lapses, if bounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Whether signing parties must sign in order.
    #[serde(default)]
    pub is_sequential_signing: bool,
    /// Attached files.
    #[serde(default)]
    pub files: Vec<ContractFile>,
    /// Caller-supplied metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Days between signature reminders. Defaults to 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_interval_days: Option<u32>,
    /// Days until signature requests expire. Defaults to 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<u32>,
}

/// Partial update for a contract. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New variable values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
    /// New effective date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<DateTime<Utc>>,
    /// New expiration date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Replacement file list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ContractFile>>,
    /// URL of the rendered final document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_document_url: Option<String>,
    /// Replacement metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ContractPatch {
    /// Apply the patch, returning the names of the fields that changed.
    /// The audit log records field names only, to stay compact.
    pub fn apply(&self, record: &mut ContractRecord) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(title) = &self.title {
            record.title = title.clone();
            changed.push("title");
        }
        if let Some(content) = &self.content {
            record.content = content.clone();
            changed.push("content");
        }
        if let Some(variables) = &self.variables {
            record.variables = Some(variables.clone());
            changed.push("variables");
        }
        if let Some(effective_date) = self.effective_date {
            record.effective_date = effective_date;
            changed.push("effectiveDate");
        }
        if let Some(expiration_date) = self.expiration_date {
            record.expiration_date = Some(expiration_date);
            changed.push("expirationDate");
        }
        if let Some(files) = &self.files {
            record.files = files.clone();
            changed.push("files");
        }
        if let Some(url) = &self.final_document_url {
            record.final_document_url = Some(url.clone());
            changed.push("finalDocumentUrl");
        }
        if let Some(metadata) = &self.metadata {
            record.metadata = Some(metadata.clone());
            changed.push("metadata");
        }
        changed
    }
}
