//! # Signature API
//!
//! Signing and declining of individual signature requests. Both
//! endpoints capture client IP and user agent as signature evidence and
//! attribute the action to the `X-User-Id` header.
//!
//! ## Endpoints
//!
//! - `GET /v1/signatures/:id` — get signature request
//! - `POST /v1/signatures/:id/sign` — apply a signature
//! - `POST /v1/signatures/:id/decline` — decline, cancelling the contract

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use consign_core::SignatureId;
use consign_engine::{SignRequest, SignatureRecord};

use crate::error::AppError;
use crate::extractors::{
    actor_from_headers, client_meta_from_headers, extract_validated_json, Validate,
};
use crate::routes::{envelope, persist_contract, Envelope};
use crate::state::AppState;

/// Request body for declining a signature.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeclineSignatureRequest {
    /// The signer's stated reason. Required.
    pub reason: String,
}

impl Validate for DeclineSignatureRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".to_string());
        }
        Ok(())
    }
}

/// Build the signatures router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/signatures/:id", get(get_signature))
        .route("/v1/signatures/:id/sign", post(sign_document))
        .route("/v1/signatures/:id/decline", post(decline_signature))
}

/// GET /v1/signatures/:id — Get a signature request.
#[utoipa::path(
    get,
    path = "/v1/signatures/{id}",
    params(("id" = Uuid, Path, description = "Signature request ID")),
    responses(
        (status = 200, description = "Signature request found"),
        (status = 404, description = "Signature request not found", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub async fn get_signature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<SignatureRecord>>, AppError> {
    let record = state
        .manager
        .signature_tracker()
        .get(SignatureId::from_uuid(id))?;
    Ok(envelope(record))
}

/// POST /v1/signatures/:id/sign — Apply a signature to a pending request.
#[utoipa::path(
    post,
    path = "/v1/signatures/{id}/sign",
    params(("id" = Uuid, Path, description = "Signature request ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Signature recorded; contract status reconciled"),
        (status = 404, description = "Signature request not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request not pending, expired, or out of sequential order", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub async fn sign_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Json<SignRequest>, JsonRejection>,
) -> Result<Json<Envelope<SignatureRecord>>, AppError> {
    let request = extract_validated_json(body)?;
    let actor = actor_from_headers(&headers);
    let meta = client_meta_from_headers(&headers);

    let signature_id = SignatureId::from_uuid(id);
    let result = state
        .manager
        .sign_document(signature_id, request, &meta, &actor);

    // The lazy-expiry transition mutates state even when the call fails,
    // so the graph is persisted on both paths before returning.
    match result {
        Ok(record) => {
            persist_contract(&state, record.contract_id).await?;
            Ok(envelope(record))
        }
        Err(err) => {
            if let Ok(record) = state.manager.signature_tracker().get(signature_id) {
                persist_contract(&state, record.contract_id).await?;
            }
            Err(err.into())
        }
    }
}

/// POST /v1/signatures/:id/decline — Decline a pending request.
///
/// One decline is terminal for the whole contract: the contract and its
/// workflow are cancelled, and already-collected signatures are kept as
/// evidence.
#[utoipa::path(
    post,
    path = "/v1/signatures/{id}/decline",
    params(("id" = Uuid, Path, description = "Signature request ID")),
    request_body = DeclineSignatureRequest,
    responses(
        (status = 200, description = "Signature declined; contract cancelled"),
        (status = 404, description = "Signature request not found", body = crate::error::ErrorBody),
        (status = 409, description = "Request is not pending", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub async fn decline_signature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Json<DeclineSignatureRequest>, JsonRejection>,
) -> Result<Json<Envelope<SignatureRecord>>, AppError> {
    let req = extract_validated_json(body)?;
    let actor = actor_from_headers(&headers);
    let meta = client_meta_from_headers(&headers);

    let record = state
        .manager
        .decline_signature(SignatureId::from_uuid(id), req.reason, &meta, &actor)?;
    persist_contract(&state, record.contract_id).await?;
    Ok(envelope(record))
}
