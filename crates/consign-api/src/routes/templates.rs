//! # Contract Template API
//!
//! CRUD over reusable contract templates. Deletion is soft: a removed
//! template disappears from listings but stays fetchable by id so
//! existing contracts keep a valid back-reference.
//!
//! ## Endpoints
//!
//! - `POST /v1/templates` — create template
//! - `GET /v1/templates` — list active templates (optional `?type=` filter)
//! - `GET /v1/templates/:id` — get template (active or not)
//! - `PUT /v1/templates/:id` — update template
//! - `DELETE /v1/templates/:id` — deactivate template

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use consign_core::{ContractType, TemplateId};
use consign_engine::{NewTemplate, TemplatePatch, TemplateRecord};

use crate::error::AppError;
use crate::extractors::{actor_from_headers, extract_json, extract_validated_json};
use crate::routes::{envelope, Envelope};
use crate::state::AppState;

/// Query parameters for template listing.
#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    /// Restrict the listing to one contract type.
    #[serde(rename = "type")]
    pub contract_type: Option<ContractType>,
}

/// Build the templates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/templates", get(list_templates).post(create_template))
        .route(
            "/v1/templates/:id",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
}

/// Persist a template row when a database is configured.
async fn persist(state: &AppState, record: &TemplateRecord) -> Result<(), AppError> {
    if let Some(pool) = &state.db_pool {
        crate::db::templates::upsert(pool, record).await?;
    }
    Ok(())
}

/// POST /v1/templates — Create a template.
#[utoipa::path(
    post,
    path = "/v1/templates",
    request_body = Object,
    responses(
        (status = 201, description = "Template created"),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "templates"
)]
pub async fn create_template(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewTemplate>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<TemplateRecord>>), AppError> {
    let input = extract_validated_json(body)?;
    let actor = actor_from_headers(&headers);
    let record = state.templates.create(input, &actor);
    persist(&state, &record).await?;
    Ok((StatusCode::CREATED, envelope(record)))
}

/// GET /v1/templates — List active templates.
#[utoipa::path(
    get,
    path = "/v1/templates",
    params(("type" = Option<String>, Query, description = "Contract type filter")),
    responses(
        (status = 200, description = "Active templates, newest first"),
    ),
    tag = "templates"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<ListTemplatesQuery>,
) -> Json<Envelope<Vec<TemplateRecord>>> {
    envelope(state.templates.list(query.contract_type))
}

/// GET /v1/templates/:id — Get a template, active or not.
#[utoipa::path(
    get,
    path = "/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template found"),
        (status = 404, description = "Template not found", body = crate::error::ErrorBody),
    ),
    tag = "templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TemplateRecord>>, AppError> {
    let record = state.templates.get(TemplateId::from_uuid(id))?;
    Ok(envelope(record))
}

/// PUT /v1/templates/:id — Apply a partial update.
#[utoipa::path(
    put,
    path = "/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Template updated"),
        (status = 404, description = "Template not found", body = crate::error::ErrorBody),
    ),
    tag = "templates"
)]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<TemplatePatch>, JsonRejection>,
) -> Result<Json<Envelope<TemplateRecord>>, AppError> {
    let patch = extract_json(body)?;
    let record = state.templates.update(TemplateId::from_uuid(id), patch)?;
    persist(&state, &record).await?;
    Ok(envelope(record))
}

/// DELETE /v1/templates/:id — Soft-delete a template.
#[utoipa::path(
    delete,
    path = "/v1/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template deactivated"),
        (status = 404, description = "Template not found", body = crate::error::ErrorBody),
    ),
    tag = "templates"
)]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<TemplateRecord>>, AppError> {
    let record = state.templates.deactivate(TemplateId::from_uuid(id))?;
    persist(&state, &record).await?;
    Ok(envelope(record))
}
