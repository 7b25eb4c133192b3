//! Signature request persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `signatures` table.
//! The unique index on `(contract_id, signer_email)` backs the engine's
//! duplicate-request check.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use consign_core::{ContractId, Geolocation, PartyId, SignatureId, WorkflowId};
use consign_engine::SignatureRecord;
use consign_state::{SignatureStatus, SignatureType};

/// Serialize optional coordinates to JSON for persistence.
fn serialize_geolocation(
    geolocation: &Option<Geolocation>,
) -> Result<Option<serde_json::Value>, sqlx::Error> {
    geolocation
        .as_ref()
        .map(|g| {
            serde_json::to_value(g).map_err(|e| {
                tracing::error!(error = %e, "failed to serialize signature geolocation");
                sqlx::Error::Encode(Box::new(e))
            })
        })
        .transpose()
}

/// Insert or update a signature row.
pub async fn upsert(pool: &PgPool, record: &SignatureRecord) -> Result<(), sqlx::Error> {
    let geolocation = serialize_geolocation(&record.geolocation)?;

    sqlx::query(
        "INSERT INTO signatures
             (id, contract_id, workflow_id, signer_id, signer_name, signer_email,
              status, signature_type, signed_at, declined_at, decline_reason,
              signature_data, ip_address, user_agent, geolocation, certificate,
              reminder_sent_at, expires_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                 $15, $16, $17, $18, $19, $20)
         ON CONFLICT (id) DO UPDATE SET
             status = EXCLUDED.status,
             signed_at = EXCLUDED.signed_at,
             declined_at = EXCLUDED.declined_at,
             decline_reason = EXCLUDED.decline_reason,
             signature_data = EXCLUDED.signature_data,
             ip_address = EXCLUDED.ip_address,
             user_agent = EXCLUDED.user_agent,
             geolocation = EXCLUDED.geolocation,
             certificate = EXCLUDED.certificate,
             reminder_sent_at = EXCLUDED.reminder_sent_at,
             expires_at = EXCLUDED.expires_at,
             updated_at = EXCLUDED.updated_at",
    )
    .bind(record.id.as_uuid())
    .bind(record.contract_id.as_uuid())
    .bind(record.workflow_id.as_uuid())
    .bind(record.signer_id.as_str())
    .bind(&record.signer_name)
    .bind(&record.signer_email)
    .bind(record.status.as_str())
    .bind(record.signature_type.as_str())
    .bind(record.signed_at)
    .bind(record.declined_at)
    .bind(&record.decline_reason)
    .bind(&record.signature_data)
    .bind(&record.ip_address)
    .bind(&record.user_agent)
    .bind(&geolocation)
    .bind(&record.certificate)
    .bind(record.reminder_sent_at)
    .bind(record.expires_at)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all signature requests into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<SignatureRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SignatureRow>(
        "SELECT id, contract_id, workflow_id, signer_id, signer_name, signer_email,
                status, signature_type, signed_at, declined_at, decline_reason,
                signature_data, ip_address, user_agent, geolocation, certificate,
                reminder_sent_at, expires_at, created_at, updated_at
         FROM signatures ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SignatureRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SignatureRow {
    id: Uuid,
    contract_id: Uuid,
    workflow_id: Uuid,
    signer_id: String,
    signer_name: String,
    signer_email: String,
    status: String,
    signature_type: String,
    signed_at: Option<DateTime<Utc>>,
    declined_at: Option<DateTime<Utc>>,
    decline_reason: Option<String>,
    signature_data: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    geolocation: Option<serde_json::Value>,
    certificate: Option<String>,
    reminder_sent_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SignatureRow {
    fn into_record(self) -> SignatureRecord {
        let status: SignatureStatus =
            serde_json::from_value(serde_json::Value::String(self.status.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        status = %self.status,
                        error = %e,
                        "unknown signature status in database — defaulting to PENDING; investigate"
                    );
                    SignatureStatus::Pending
                });

        let signature_type: SignatureType =
            serde_json::from_value(serde_json::Value::String(self.signature_type.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        signature_type = %self.signature_type,
                        error = %e,
                        "unknown signature type in database — defaulting to SIMPLE"
                    );
                    SignatureType::Simple
                });

        let geolocation: Option<Geolocation> = self.geolocation.and_then(|value| {
            serde_json::from_value(value)
                .map_err(|e| {
                    tracing::error!(
                        id = %self.id,
                        error = %e,
                        "failed to deserialize signature geolocation — dropping"
                    );
                })
                .ok()
        });

        SignatureRecord {
            id: SignatureId::from_uuid(self.id),
            contract_id: ContractId::from_uuid(self.contract_id),
            workflow_id: WorkflowId::from_uuid(self.workflow_id),
            signer_id: PartyId::from_raw(self.signer_id),
            signer_name: self.signer_name,
            signer_email: self.signer_email,
            status,
            signature_type,
            signed_at: self.signed_at,
            declined_at: self.declined_at,
            decline_reason: self.decline_reason,
            signature_data: self.signature_data,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            geolocation,
            certificate: self.certificate,
            reminder_sent_at: self.reminder_sent_at,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
