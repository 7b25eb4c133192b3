//! Signing workflow persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `signing_workflows`
//! table. Steps are stored as a JSON array; their ordering invariant
//! (sorted by `order`) is maintained by the engine before persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use consign_core::{ContractId, WorkflowId};
use consign_engine::WorkflowRecord;
use consign_state::{WorkflowStatus, WorkflowStep};

/// Serialize the step list to JSON for persistence.
fn serialize_steps(steps: &[WorkflowStep]) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(steps).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize workflow steps");
        sqlx::Error::Encode(Box::new(e))
    })
}

/// Insert or update a workflow row.
pub async fn upsert(pool: &PgPool, record: &WorkflowRecord) -> Result<(), sqlx::Error> {
    let steps = serialize_steps(&record.steps)?;

    sqlx::query(
        "INSERT INTO signing_workflows
             (id, contract_id, name, is_sequential, current_step, total_steps,
              steps, status, started_at, completed_at, cancelled_at,
              reminder_interval_days, expiration_days, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         ON CONFLICT (id) DO UPDATE SET
             current_step = EXCLUDED.current_step,
             steps = EXCLUDED.steps,
             status = EXCLUDED.status,
             started_at = EXCLUDED.started_at,
             completed_at = EXCLUDED.completed_at,
             cancelled_at = EXCLUDED.cancelled_at,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(record.id.as_uuid())
    .bind(record.contract_id.as_uuid())
    .bind(&record.name)
    .bind(record.is_sequential)
    .bind(record.current_step as i32)
    .bind(record.total_steps as i32)
    .bind(&steps)
    .bind(record.status.as_str())
    .bind(record.started_at)
    .bind(record.completed_at)
    .bind(record.cancelled_at)
    .bind(record.reminder_interval_days as i32)
    .bind(record.expiration_days as i32)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all workflows into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<WorkflowRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, WorkflowRow>(
        "SELECT id, contract_id, name, is_sequential, current_step, total_steps,
                steps, status, started_at, completed_at, cancelled_at,
                reminder_interval_days, expiration_days, created_at, updated_at
         FROM signing_workflows ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(WorkflowRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct WorkflowRow {
    id: Uuid,
    contract_id: Uuid,
    name: String,
    is_sequential: bool,
    current_step: i32,
    total_steps: i32,
    steps: serde_json::Value,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    reminder_interval_days: i32,
    expiration_days: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkflowRow {
    fn into_record(self) -> WorkflowRecord {
        let status: WorkflowStatus =
            serde_json::from_value(serde_json::Value::String(self.status.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        status = %self.status,
                        error = %e,
                        "unknown workflow status in database — defaulting to PENDING; investigate"
                    );
                    WorkflowStatus::Pending
                });

        let steps: Vec<WorkflowStep> = serde_json::from_value(self.steps.clone()).unwrap_or_else(|e| {
            tracing::error!(
                id = %self.id,
                error = %e,
                "failed to deserialize workflow steps — defaulting to empty; investigate"
            );
            Vec::new()
        });

        WorkflowRecord {
            id: WorkflowId::from_uuid(self.id),
            contract_id: ContractId::from_uuid(self.contract_id),
            name: self.name,
            is_sequential: self.is_sequential,
            current_step: self.current_step.max(0) as u32,
            total_steps: self.total_steps.max(0) as u32,
            steps,
            status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            reminder_interval_days: self.reminder_interval_days.max(0) as u32,
            expiration_days: self.expiration_days.max(0) as u32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
