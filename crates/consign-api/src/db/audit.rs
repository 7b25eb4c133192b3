//! Audit log persistence operations.
//!
//! The `contract_audit_logs` table is append-only: rows are inserted with
//! `ON CONFLICT (id) DO NOTHING` and never updated or deleted, preserving
//! the hash chain. A `seq` column fixes the chain order for hydration.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use consign_core::{ActorType, ContractId};
use consign_engine::AuditLogEntry;

/// Insert an audit entry. Re-inserting an existing entry is a no-op.
pub async fn insert(pool: &PgPool, entry: &AuditLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contract_audit_logs
             (id, contract_id, action, actor, actor_type, details,
              ip_address, user_agent, occurred_at, previous_hash, entry_hash)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(entry.id)
    .bind(entry.contract_id.as_uuid())
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(entry.actor_type.as_str())
    .bind(&entry.details)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(entry.timestamp)
    .bind(&entry.previous_hash)
    .bind(&entry.entry_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the full audit log in chain order on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, contract_id, action, actor, actor_type, details,
                ip_address, user_agent, occurred_at, previous_hash, entry_hash
         FROM contract_audit_logs ORDER BY seq",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AuditRow::into_entry).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    contract_id: Uuid,
    action: String,
    actor: String,
    actor_type: String,
    details: serde_json::Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    occurred_at: DateTime<Utc>,
    previous_hash: String,
    entry_hash: String,
}

impl AuditRow {
    fn into_entry(self) -> AuditLogEntry {
        let actor_type: ActorType =
            serde_json::from_value(serde_json::Value::String(self.actor_type.clone()))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        id = %self.id,
                        actor_type = %self.actor_type,
                        error = %e,
                        "unknown actor type in audit log — defaulting to SYSTEM"
                    );
                    ActorType::System
                });

        AuditLogEntry {
            id: self.id,
            contract_id: ContractId::from_uuid(self.contract_id),
            action: self.action,
            actor: self.actor,
            actor_type,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: self.occurred_at,
            previous_hash: self.previous_hash,
            entry_hash: self.entry_hash,
        }
    }
}
