//! # Contract Lifecycle API
//!
//! Contract creation, partial updates, dispatch for signing, and
//! cancellation, plus per-contract views of the signature set, the
//! signing workflow, and the audit trail.
//!
//! ## Endpoints
//!
//! - `POST /v1/contracts` — create contract (DRAFT) with its workflow
//! - `GET /v1/contracts` — list by creator or party email
//! - `GET /v1/contracts/:id` — get contract
//! - `PUT /v1/contracts/:id` — partial update
//! - `POST /v1/contracts/:id/send` — dispatch for signatures
//! - `POST /v1/contracts/:id/cancel` — cancel with optional reason
//! - `GET /v1/contracts/:id/signatures` — signature requests
//! - `GET /v1/contracts/:id/workflow` — signing workflow
//! - `GET /v1/contracts/:id/audit` — audit trail

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use consign_core::ContractId;
use consign_engine::{
    AuditLogEntry, ContractPatch, ContractRecord, NewContract, SignatureRecord, WorkflowRecord,
};

use crate::error::AppError;
use crate::extractors::{actor_from_headers, extract_json, extract_validated_json};
use crate::routes::{envelope, persist_contract, Envelope};
use crate::state::AppState;

/// Query parameters for contract listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContractsQuery {
    /// Creator user id to filter by.
    pub created_by: Option<String>,
    /// Party email to filter by.
    pub party_email: Option<String>,
}

/// Request body for contract cancellation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelContractRequest {
    /// Why the contract is being cancelled.
    pub reason: Option<String>,
}

/// Build the contracts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/contracts", get(list_contracts).post(create_contract))
        .route(
            "/v1/contracts/:id",
            get(get_contract).put(update_contract),
        )
        .route("/v1/contracts/:id/send", post(send_for_signatures))
        .route("/v1/contracts/:id/cancel", post(cancel_contract))
        .route("/v1/contracts/:id/signatures", get(list_signatures))
        .route("/v1/contracts/:id/workflow", get(get_workflow))
        .route("/v1/contracts/:id/audit", get(get_audit_trail))
}

/// POST /v1/contracts — Create a contract in DRAFT with its workflow.
#[utoipa::path(
    post,
    path = "/v1/contracts",
    request_body = Object,
    responses(
        (status = 201, description = "Contract created in DRAFT with a numbered contract and a PENDING workflow"),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewContract>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<ContractRecord>>), AppError> {
    let input = extract_validated_json(body)?;
    let actor = actor_from_headers(&headers);
    let record = state.manager.create_contract(input, &actor)?;
    persist_contract(&state, record.id).await?;
    Ok((StatusCode::CREATED, envelope(record)))
}

/// GET /v1/contracts — List contracts, newest first.
///
/// Filters by `createdBy` or `partyEmail`; with neither, lists the
/// acting user's own contracts.
#[utoipa::path(
    get,
    path = "/v1/contracts",
    params(
        ("createdBy" = Option<String>, Query, description = "Creator user id"),
        ("partyEmail" = Option<String>, Query, description = "Declared party email"),
    ),
    responses(
        (status = 200, description = "Matching contracts, newest first"),
    ),
    tag = "contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListContractsQuery>,
) -> Json<Envelope<Vec<ContractRecord>>> {
    let records = if let Some(created_by) = &query.created_by {
        state.manager.contracts_by_creator(created_by)
    } else if let Some(party_email) = &query.party_email {
        state.manager.contracts_by_party_email(party_email)
    } else {
        let actor = actor_from_headers(&headers);
        state.manager.contracts_by_creator(actor.as_audit_str())
    };
    envelope(records)
}

/// GET /v1/contracts/:id — Get a contract.
#[utoipa::path(
    get,
    path = "/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract found"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ContractRecord>>, AppError> {
    let record = state.manager.get_contract(ContractId::from_uuid(id))?;
    Ok(envelope(record))
}

/// PUT /v1/contracts/:id — Apply a partial update.
#[utoipa::path(
    put,
    path = "/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Contract updated"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
        (status = 409, description = "Contract is FULLY_SIGNED or COMPLETED", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Json<ContractPatch>, JsonRejection>,
) -> Result<Json<Envelope<ContractRecord>>, AppError> {
    let patch = extract_json(body)?;
    let actor = actor_from_headers(&headers);
    let record = state
        .manager
        .update_contract(ContractId::from_uuid(id), patch, &actor)?;
    persist_contract(&state, record.id).await?;
    Ok(envelope(record))
}

/// POST /v1/contracts/:id/send — Dispatch a DRAFT contract for signing.
#[utoipa::path(
    post,
    path = "/v1/contracts/{id}/send",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract moved to PENDING_SIGNATURES; one pending signature request per signer"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
        (status = 409, description = "Contract is not in DRAFT", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn send_for_signatures(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Envelope<ContractRecord>>, AppError> {
    let actor = actor_from_headers(&headers);
    let record = state
        .manager
        .send_for_signatures(ContractId::from_uuid(id), &actor)?;
    persist_contract(&state, record.id).await?;
    Ok(envelope(record))
}

/// POST /v1/contracts/:id/cancel — Cancel a contract and its workflow.
#[utoipa::path(
    post,
    path = "/v1/contracts/{id}/cancel",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = CancelContractRequest,
    responses(
        (status = 200, description = "Contract cancelled"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
        (status = 409, description = "Contract is already COMPLETED or CANCELLED", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn cancel_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Json<CancelContractRequest>, JsonRejection>,
) -> Result<Json<Envelope<ContractRecord>>, AppError> {
    let req = extract_json(body)?;
    let actor = actor_from_headers(&headers);
    let record = state
        .manager
        .cancel_contract(ContractId::from_uuid(id), req.reason, &actor)?;
    persist_contract(&state, record.id).await?;
    Ok(envelope(record))
}

/// GET /v1/contracts/:id/signatures — Signature requests, oldest first.
#[utoipa::path(
    get,
    path = "/v1/contracts/{id}/signatures",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Signature requests for the contract"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn list_signatures(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<SignatureRecord>>>, AppError> {
    let records = state
        .manager
        .signatures_for_contract(ContractId::from_uuid(id))?;
    Ok(envelope(records))
}

/// GET /v1/contracts/:id/workflow — The contract's signing workflow.
#[utoipa::path(
    get,
    path = "/v1/contracts/{id}/workflow",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Signing workflow"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<WorkflowRecord>>, AppError> {
    let record = state
        .manager
        .workflow_for_contract(ContractId::from_uuid(id))?;
    Ok(envelope(record))
}

/// GET /v1/contracts/:id/audit — The contract's audit trail, chronological.
#[utoipa::path(
    get,
    path = "/v1/contracts/{id}/audit",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Hash-chained audit entries"),
        (status = 404, description = "Contract not found", body = crate::error::ErrorBody),
    ),
    tag = "contracts"
)]
pub async fn get_audit_trail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<AuditLogEntry>>>, AppError> {
    let entries = state
        .manager
        .audit_for_contract(ContractId::from_uuid(id))?;
    Ok(envelope(entries))
}
