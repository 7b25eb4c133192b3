//! # Contract Parties
//!
//! A party is a participant declared on a contract: an individual or a
//! company, with a role in the logistics exchange and an optional position
//! in a sequential signing order. Parties are contract-local — the same
//! email on two contracts is two distinct parties.

use serde::{Deserialize, Serialize};

use crate::identity::PartyId;

/// Whether a party is a natural person or a legal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    /// A natural person.
    Individual,
    /// A legal entity; carries [`CompanyDetails`].
    Company,
}

impl PartyType {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Company => "COMPANY",
        }
    }
}

/// The party's role in the underlying logistics exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyRole {
    /// Originator of the goods or service.
    Sender,
    /// Recipient of the goods or service.
    Receiver,
    /// Transport operator.
    Carrier,
    /// Observes and attests without being a principal.
    Witness,
    /// Approves the contract on behalf of an organization.
    Approver,
}

impl PartyRole {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "SENDER",
            Self::Receiver => "RECEIVER",
            Self::Carrier => "CARRIER",
            Self::Witness => "WITNESS",
            Self::Approver => "APPROVER",
        }
    }
}

/// Company registration details for [`PartyType::Company`] parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    /// Registered company name.
    pub name: String,
    /// VAT number, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    /// Commercial registration number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    /// Registered address.
    pub address: String,
}

/// A participant declared on a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Contract-local identifier (`party-1`, `party-2`, ...), assigned at
    /// contract creation.
    pub id: PartyId,
    /// Individual or company.
    #[serde(rename = "type")]
    pub party_type: PartyType,
    /// Display name.
    pub name: String,
    /// Contact and signer-matching email.
    pub email: String,
    /// Optional phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Company details for company parties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyDetails>,
    /// Role in the exchange.
    pub role: PartyRole,
    /// Whether this party must sign the contract.
    pub signature_required: bool,
    /// Position in the sequential signing order. Required on every signing
    /// party when the contract uses sequential signing; ignored otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_order: Option<u32>,
}

impl Party {
    /// Whether this party participates in the signing workflow.
    pub fn is_signer(&self) -> bool {
        self.signature_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_party() -> Party {
        Party {
            id: PartyId::from_position(1),
            party_type: PartyType::Company,
            name: "Nordfracht GmbH".to_string(),
            email: "ops@nordfracht.example".to_string(),
            phone: None,
            company: Some(CompanyDetails {
                name: "Nordfracht GmbH".to_string(),
                vat_number: Some("DE812345678".to_string()),
                registration_number: None,
                address: "Hafenstrasse 12, Hamburg".to_string(),
            }),
            role: PartyRole::Carrier,
            signature_required: true,
            signature_order: Some(1),
        }
    }

    #[test]
    fn party_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample_party()).unwrap();
        assert_eq!(json["type"], "COMPANY");
        assert_eq!(json["role"], "CARRIER");
        assert_eq!(json["signatureRequired"], true);
        assert_eq!(json["signatureOrder"], 1);
        assert_eq!(json["company"]["vatNumber"], "DE812345678");
    }

    #[test]
    fn signer_flag_follows_signature_required() {
        let mut party = sample_party();
        assert!(party.is_signer());
        party.signature_required = false;
        assert!(!party.is_signer());
    }

    #[test]
    fn role_round_trips() {
        for role in [
            PartyRole::Sender,
            PartyRole::Receiver,
            PartyRole::Carrier,
            PartyRole::Witness,
            PartyRole::Approver,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            let back: PartyRole = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }
}
