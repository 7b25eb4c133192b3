//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the contract
//! platform. Each identifier is a distinct type — you cannot pass a
//! [`SignatureId`] where a [`ContractId`] is expected.
//!
//! UUID-based identifiers ([`ContractId`], [`TemplateId`], [`SignatureId`],
//! [`WorkflowId`]) are always valid by construction. [`PartyId`] is a
//! contract-local ordinal identifier (`party-1`, `party-2`, ...) assigned
//! when a contract is created.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(Uuid);

impl ContractId {
    /// Create a new random contract identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a contract identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a contract template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Create a new random template identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a template identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a signature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureId(Uuid);

impl SignatureId {
    /// Create a new random signature identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a signature identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SignatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SignatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a signing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Create a new random workflow identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a workflow identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contract-local party identifier.
///
/// Parties are not global principals; they exist within a single contract
/// and are numbered in declaration order: `party-1`, `party-2`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Create a party identifier from a 1-based position in the party list.
    pub fn from_position(position: usize) -> Self {
        Self(format!("party-{position}"))
    }

    /// Create a party identifier from a raw string (e.g. when loading
    /// persisted contracts).
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_id_unique() {
        let a = ContractId::new();
        let b = ContractId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn contract_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = ContractId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn signature_id_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        let id = SignatureId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn party_id_positional() {
        assert_eq!(PartyId::from_position(1).as_str(), "party-1");
        assert_eq!(PartyId::from_position(12).as_str(), "party-12");
    }

    #[test]
    fn party_id_serializes_transparent() {
        let id = PartyId::from_position(2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"party-2\"");
    }
}
