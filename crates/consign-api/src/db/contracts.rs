//! Contract persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `contracts` table.
//! State machine constraints are enforced at the application layer (via
//! `ContractStatus::valid_transitions()`), not in SQL; the database only
//! guarantees contract number uniqueness.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use consign_core::{ContractFile, ContractId, ContractType, Party, TemplateId, WorkflowId};
use consign_engine::ContractRecord;
use consign_state::ContractStatus;

fn encode_json<T: serde::Serialize>(value: &T, what: &'static str) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, what, "failed to serialize contract field");
        sqlx::Error::Encode(Box::new(e))
    })
}

/// Insert or update a contract row.
pub async fn upsert(pool: &PgPool, record: &ContractRecord) -> Result<(), sqlx::Error> {
    let parties = encode_json(&record.parties, "parties")?;
    let files = encode_json(&record.files, "files")?;

    sqlx::query(
        "INSERT INTO contracts
             (id, contract_number, title, contract_type, status, template_id,
              parties, content, variables, effective_date, expiration_date,
              signing_workflow_id, is_sequential_signing, files,
              final_document_url, created_by, metadata, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                 $15, $16, $17, $18, $19)
         ON CONFLICT (id) DO UPDATE SET
             title = EXCLUDED.title,
             status = EXCLUDED.status,
             parties = EXCLUDED.parties,
             content = EXCLUDED.content,
             variables = EXCLUDED.variables,
             effective_date = EXCLUDED.effective_date,
             expiration_date = EXCLUDED.expiration_date,
             signing_workflow_id = EXCLUDED.signing_workflow_id,
             files = EXCLUDED.files,
             final_document_url = EXCLUDED.final_document_url,
             metadata = EXCLUDED.metadata,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(record.id.as_uuid())
    .bind(&record.contract_number)
    .bind(&record.title)
    .bind(record.contract_type.as_str())
    .bind(record.status.as_str())
    .bind(record.template_id.as_ref().map(|t| *t.as_uuid()))
    .bind(&parties)
    .bind(&record.content)
    .bind(&record.variables)
    .bind(record.effective_date)
    .bind(record.expiration_date)
    .bind(record.signing_workflow_id.as_ref().map(|w| *w.as_uuid()))
    .bind(record.is_sequential_signing)
    .bind(&files)
    .bind(&record.final_document_url)
    .bind(&record.created_by)
    .bind(&record.metadata)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all contracts into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ContractRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ContractRow>(
        "SELECT id, contract_number, title, contract_type, status, template_id,
                parties, content, variables, effective_date, expiration_date,
                signing_workflow_id, is_sequential_signing, files,
                final_document_url, created_by, metadata, created_at, updated_at
         FROM contracts ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ContractRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ContractRow {
    id: Uuid,
    contract_number: String,
    title: String,
    contract_type: String,
    status: String,
    template_id: Option<Uuid>,
    parties: serde_json::Value,
    content: String,
    variables: Option<serde_json::Value>,
    effective_date: DateTime<Utc>,
    expiration_date: Option<DateTime<Utc>>,
    signing_workflow_id: Option<Uuid>,
    is_sequential_signing: bool,
    files: serde_json::Value,
    final_document_url: Option<String>,
    created_by: String,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContractRow {
    fn into_record(self) -> ContractRecord {
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

        // READ path: default to Draft for forward-compatibility, but log
        // at ERROR because an unknown status may indicate corruption.
        let status: ContractStatus =
            serde_json::from_value(serde_json::Value::String(self.status.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        status = %self.status,
                        error = %e,
                        "unknown contract status in database — defaulting to DRAFT; investigate"
                    );
                    ContractStatus::Draft
                });

        let parties: Vec<Party> = serde_json::from_value(self.parties.clone()).unwrap_or_else(|e| {
            tracing::error!(
                id = %self.id,
                error = %e,
                "failed to deserialize contract parties — defaulting to empty; investigate"
            );
            Vec::new()
        });

        let files: Vec<ContractFile> = serde_json::from_value(self.files.clone()).unwrap_or_else(|e| {
            tracing::error!(
                id = %self.id,
                error = %e,
                "failed to deserialize contract files — defaulting to empty"
            );
            Vec::new()
        });

        ContractRecord {
            id: ContractId::from_uuid(self.id),
            contract_number: self.contract_number,
            title: self.title,
            contract_type,
            status,
            template_id: self.template_id.map(TemplateId::from_uuid),
            parties,
            content: self.content,
            variables: self.variables,
            effective_date: self.effective_date,
            expiration_date: self.expiration_date,
            signing_workflow_id: self.signing_workflow_id.map(WorkflowId::from_uuid),
            is_sequential_signing: self.is_sequential_signing,
            files,
            final_document_url: self.final_document_url,
            created_by: self.created_by,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
