//! # Document Primitives
//!
//! Contract classification, template variables, file attachments, and the
//! geolocation captured at signing time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of agreement a contract or template represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    /// Electronic consignment note (eCMR).
    Ecmr,
    /// Transport agreement.
    Transport,
    /// Service agreement.
    Service,
    /// Non-disclosure agreement.
    Nda,
    /// Free-form agreement.
    Custom,
}

impl ContractType {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecmr => "ECMR",
            Self::Transport => "TRANSPORT",
            Self::Service => "SERVICE",
            Self::Nda => "NDA",
            Self::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// Calendar date.
    Date,
    /// True/false flag.
    Boolean,
    /// One of a fixed option list.
    Select,
}

/// A fill-in slot declared by a contract template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    /// Substitution key used in the template content.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Value type.
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    /// Whether the variable must be filled before the contract is sent.
    pub required: bool,
    /// Default value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    /// Allowed values for [`VariableType::Select`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A file attached to a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFile {
    /// Attachment identifier.
    pub id: String,
    /// Original file name.
    pub name: String,
    /// Storage URL.
    pub url: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Uploader user id.
    pub uploaded_by: String,
}

/// Coordinates captured at the moment a signature is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geolocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_type_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&ContractType::Ecmr).unwrap(),
            "\"ECMR\""
        );
        assert_eq!(
            serde_json::to_string(&ContractType::Transport).unwrap(),
            "\"TRANSPORT\""
        );
    }

    #[test]
    fn template_variable_wire_format() {
        let var = TemplateVariable {
            name: "load_weight".to_string(),
            label: "Load weight (kg)".to_string(),
            variable_type: VariableType::Number,
            required: true,
            default_value: None,
            options: None,
        };
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["type"], "NUMBER");
        assert_eq!(json["required"], true);
        assert!(json.get("defaultValue").is_none());
    }

    #[test]
    fn geolocation_round_trips() {
        let geo = Geolocation {
            latitude: 53.5511,
            longitude: 9.9937,
        };
        let json = serde_json::to_string(&geo).unwrap();
        let back: Geolocation = serde_json::from_str(&json).unwrap();
        assert_eq!(geo, back);
    }
}
