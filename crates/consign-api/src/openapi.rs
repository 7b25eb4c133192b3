//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consign API — Contract Lifecycle & Signing",
        version = "0.3.2",
        description = "Axum API services for the Consign platform: contract templates, contract lifecycle, signing workflows, e-signature collection, and the tamper-evident audit trail.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Templates
        crate::routes::templates::create_template,
        crate::routes::templates::list_templates,
        crate::routes::templates::get_template,
        crate::routes::templates::update_template,
        crate::routes::templates::delete_template,
        // Contracts
        crate::routes::contracts::create_contract,
        crate::routes::contracts::list_contracts,
        crate::routes::contracts::get_contract,
        crate::routes::contracts::update_contract,
        crate::routes::contracts::send_for_signatures,
        crate::routes::contracts::cancel_contract,
        crate::routes::contracts::list_signatures,
        crate::routes::contracts::get_workflow,
        crate::routes::contracts::get_audit_trail,
        // Signatures
        crate::routes::signatures::get_signature,
        crate::routes::signatures::sign_document,
        crate::routes::signatures::decline_signature,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Request DTOs
        crate::routes::contracts::CancelContractRequest,
        crate::routes::signatures::DeclineSignatureRequest,
    )),
    tags(
        (name = "templates", description = "Contract Template API"),
        (name = "contracts", description = "Contract Lifecycle API"),
        (name = "signatures", description = "Signature API"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
