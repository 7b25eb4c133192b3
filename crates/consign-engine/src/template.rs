//! # Contract Templates
//!
//! Reusable contract text with declared fill-in variables. Templates are
//! soft-deleted only: deactivation removes them from the default listing
//! but they remain fetchable by id, so existing contracts keep a valid
//! back-reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consign_core::{Actor, ContractType, TemplateId, TemplateVariable};

use crate::error::EngineError;
use crate::store::Store;

/// A reusable contract template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// Template identifier.
    pub id: TemplateId,
    /// Template name.
    pub name: String,
    /// Kind of agreement this template produces.
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    /// What the template is for.
    pub description: String,
    /// Template body with variable placeholders.
    pub content: String,
    /// Declared fill-in slots.
    pub variables: Vec<TemplateVariable>,
    /// Soft-delete flag; inactive templates are hidden from listings.
    pub is_active: bool,
    /// Template revision label.
    pub version: String,
    /// Creator's user id (audit string).
    pub created_by: String,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    /// Template name.
    pub name: String,
    /// Kind of agreement this template produces.
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    /// What the template is for.
    pub description: String,
    /// Template body with variable placeholders.
    pub content: String,
    /// Declared fill-in slots.
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    /// Revision label. Defaults to `"1.0"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Partial update for a template. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Replacement variable list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<TemplateVariable>>,
    /// New revision label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Re-activate or deactivate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Catalog of contract templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Store<TemplateRecord>,
}

impl TemplateCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the backing store, for hydration and persistence.
    pub fn store(&self) -> &Store<TemplateRecord> {
        &self.templates
    }

    /// Create a template.
    pub fn create(&self, input: NewTemplate, actor: &Actor) -> TemplateRecord {
        let now = Utc::now();
        let record = TemplateRecord {
            id: TemplateId::new(),
            name: input.name,
            contract_type: input.contract_type,
            description: input.description,
            content: input.content,
            variables: input.variables,
            is_active: true,
            version: input.version.unwrap_or_else(|| "1.0".to_string()),
            created_by: actor.as_audit_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.templates.insert(*record.id.as_uuid(), record.clone());
        tracing::info!(template_id = %record.id, name = %record.name, "template created");
        record
    }

    /// Fetch a template by id, active or not.
    pub fn get(&self, id: TemplateId) -> Result<TemplateRecord, EngineError> {
        self.templates
            .get(id.as_uuid())
            .ok_or_else(|| EngineError::not_found("template", id))
    }

    /// List active templates, optionally filtered by contract type.
    /// Deactivated templates are excluded.
    pub fn list(&self, contract_type: Option<ContractType>) -> Vec<TemplateRecord> {
        let mut templates: Vec<_> = self
            .templates
            .list()
            .into_iter()
            .filter(|t| t.is_active)
            .filter(|t| contract_type.map_or(true, |ty| t.contract_type == ty))
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        templates
    }

    /// Apply a partial update.
    pub fn update(&self, id: TemplateId, patch: TemplatePatch) -> Result<TemplateRecord, EngineError> {
        self.templates
            .update(id.as_uuid(), |t| {
                if let Some(name) = &patch.name {
                    t.name = name.clone();
                }
                if let Some(description) = &patch.description {
                    t.description = description.clone();
                }
                if let Some(content) = &patch.content {
                    t.content = content.clone();
                }
                if let Some(variables) = &patch.variables {
                    t.variables = variables.clone();
                }
                if let Some(version) = &patch.version {
                    t.version = version.clone();
                }
                if let Some(is_active) = patch.is_active {
                    t.is_active = is_active;
                }
                t.updated_at = Utc::now();
            })
            .ok_or_else(|| EngineError::not_found("template", id))
    }

    /// Soft-delete a template. Idempotent.
    pub fn deactivate(&self, id: TemplateId) -> Result<TemplateRecord, EngineError> {
        let record = self
            .templates
            .update(id.as_uuid(), |t| {
                t.is_active = false;
                t.updated_at = Utc::now();
            })
            .ok_or_else(|| EngineError::not_found("template", id))?;
        tracing::info!(template_id = %id, "template deactivated");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_template(name: &str, ty: ContractType) -> NewTemplate {
        NewTemplate {
            name: name.to_string(),
            contract_type: ty,
            description: "test template".to_string(),
            content: "Agreement between {{sender}} and {{carrier}}".to_string(),
            variables: Vec::new(),
            version: None,
        }
    }

    #[test]
    fn create_defaults_to_active_version_one() {
        let catalog = TemplateCatalog::new();
        let record = catalog.create(
            sample_template("ecmr-standard", ContractType::Ecmr),
            &Actor::user("ops-1"),
        );
        assert!(record.is_active);
        assert_eq!(record.version, "1.0");
        assert_eq!(record.created_by, "ops-1");
    }

    #[test]
    fn deactivated_templates_hidden_from_listing_but_fetchable() {
        let catalog = TemplateCatalog::new();
        let record = catalog.create(
            sample_template("ecmr-standard", ContractType::Ecmr),
            &Actor::System,
        );
        catalog.deactivate(record.id).unwrap();

        assert!(catalog.list(None).is_empty());
        let fetched = catalog.get(record.id).unwrap();
        assert!(!fetched.is_active);
    }

    #[test]
    fn list_filters_by_contract_type() {
        let catalog = TemplateCatalog::new();
        catalog.create(sample_template("a", ContractType::Ecmr), &Actor::System);
        catalog.create(sample_template("b", ContractType::Nda), &Actor::System);

        assert_eq!(catalog.list(Some(ContractType::Nda)).len(), 1);
        assert_eq!(catalog.list(None).len(), 2);
    }

    #[test]
    fn update_unknown_template_is_not_found() {
        let catalog = TemplateCatalog::new();
        let err = catalog
            .update(TemplateId::new(), TemplatePatch::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "template", .. }));
    }
}
