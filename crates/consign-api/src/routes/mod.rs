//! # API Route Modules
//!
//! Route modules for the contract platform API surface:
//!
//! - `templates` — reusable contract templates (CRUD, soft delete).
//! - `contracts` — contract lifecycle: creation, updates, dispatch for
//!   signing, cancellation, and per-contract views of signatures,
//!   workflow, and the audit trail.
//! - `signatures` — signature request operations: sign and decline.
//!
//! All happy-path responses use the `{"success": true, "data": ...}`
//! envelope; errors use [`crate::error::ErrorBody`].

pub mod contracts;
pub mod signatures;
pub mod templates;

use axum::Json;
use serde::Serialize;

use consign_core::ContractId;

use crate::error::AppError;
use crate::state::AppState;

/// Happy-path response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn envelope<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Write-through persistence of a contract's full graph.
///
/// No-op without a database pool. A write failure surfaces as a 500;
/// the in-memory state is kept, and the next successful persist of the
/// same contract re-writes the whole graph, so the database converges.
pub(crate) async fn persist_contract(
    state: &AppState,
    contract_id: ContractId,
) -> Result<(), AppError> {
    if let Some(pool) = &state.db_pool {
        crate::db::persist_contract_graph(pool, &state.manager, contract_id).await?;
    }
    Ok(())
}
