//! Template persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `contract_templates`
//! table. Soft deletion is a flipped `is_active` flag, never a `DELETE`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use consign_core::{ContractType, TemplateId, TemplateVariable};
use consign_engine::TemplateRecord;

/// Serialize the variable list to JSON for persistence.
fn serialize_variables(variables: &[TemplateVariable]) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(variables).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize template variables");
        sqlx::Error::Encode(Box::new(e))
    })
}

/// Insert or update a template row.
pub async fn upsert(pool: &PgPool, record: &TemplateRecord) -> Result<(), sqlx::Error> {
    let variables = serialize_variables(&record.variables)?;

    sqlx::query(
        "INSERT INTO contract_templates
             (id, name, contract_type, description, content, variables,
              is_active, version, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (id) DO UPDATE SET
             name = EXCLUDED.name,
             description = EXCLUDED.description,
             content = EXCLUDED.content,
             variables = EXCLUDED.variables,
             is_active = EXCLUDED.is_active,
             version = EXCLUDED.version,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(record.id.as_uuid())
    .bind(&record.name)
    .bind(record.contract_type.as_str())
    .bind(&record.description)
    .bind(&record.content)
    .bind(&variables)
    .bind(record.is_active)
    .bind(&record.version)
    .bind(&record.created_by)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all templates into the in-memory catalog on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<TemplateRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TemplateRow>(
        "SELECT id, name, contract_type, description, content, variables,
                is_active, version, created_by, created_at, updated_at
         FROM contract_templates ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TemplateRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    contract_type: String,
    description: String,
    content: String,
    variables: serde_json::Value,
    is_active: bool,
    version: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TemplateRow {
    fn into_record(self) -> TemplateRecord {
        let contract_type: ContractType =
            serde_json::from_value(serde_json::Value::String(self.contract_type.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        contract_type = %self.contract_type,
                        error = %e,
                        "unknown contract type in database — defaulting to CUSTOM"
                    );
                    ContractType::Custom
                });

        let variables: Vec<TemplateVariable> = serde_json::from_value(self.variables.clone())
            .unwrap_or_else(|e| {
                tracing::error!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize template variables — defaulting to empty"
                );
                Vec::new()
            });

        TemplateRecord {
            id: TemplateId::from_uuid(self.id),
            name: self.name,
            contract_type,
            description: self.description,
            content: self.content,
            variables,
            is_active: self.is_active,
            version: self.version,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
