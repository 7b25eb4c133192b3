//! # Postgres Persistence
//!
//! Optional write-through persistence behind the in-memory stores.
//! Handlers mutate the engine first, then persist before returning, so
//! a write failure surfaces as a 500 instead of silently diverging the
//! database from memory. Read paths deserialize defensively: a row that
//! no longer parses is loaded with a safe default and logged at ERROR.

pub mod audit;
pub mod contracts;
pub mod signatures;
pub mod templates;
pub mod workflows;

use consign_core::ContractId;
use consign_engine::ContractLifecycleManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create a connection pool from `DATABASE_URL`.
///
/// An absent or empty variable is not an error: the service runs with
/// in-memory stores only.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::info!("DATABASE_URL not set; running with in-memory stores only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;
    tracing::info!("connected to Postgres");
    Ok(Some(pool))
}

/// Persist the full graph of a contract after a mutating operation:
/// the contract row, its workflow, every signature request, and the
/// contract's audit entries.
///
/// Audit inserts are `ON CONFLICT DO NOTHING`, so re-persisting entries
/// already stored by an earlier operation is a no-op.
pub async fn persist_contract_graph(
    pool: &PgPool,
    manager: &ContractLifecycleManager,
    contract_id: ContractId,
) -> Result<(), sqlx::Error> {
    if let Some(contract) = manager.contracts().get(contract_id.as_uuid()) {
        contracts::upsert(pool, &contract).await?;
    }
    if let Ok(workflow) = manager.workflow_engine().get_by_contract(contract_id) {
        workflows::upsert(pool, &workflow).await?;
    }
    for signature in manager
        .signature_tracker()
        .list_for_contract(contract_id)
    {
        signatures::upsert(pool, &signature).await?;
    }
    for entry in manager.audit().for_contract(contract_id) {
        audit::insert(pool, &entry).await?;
    }
    Ok(())
}
