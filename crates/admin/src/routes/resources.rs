//! Generic CRUD over the backend's catalog collections.
//!
//! Records pass through as JSON values: the admin API validates what it
//! must (required fields, SKU option uniqueness) and leaves the rest of the
//! schema to the backend.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use circuit_bazaar_core::catalog::ProductSku;
use circuit_bazaar_core::{ProductId, RecordStatus, SkuId};
use circuit_bazaar_gateway::{ApiClient, GatewayError, ListQuery, ResourceKind};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::{
    ResourcePayload, WriteKind, check_sku_options, missing_fields, sku_options,
};
use crate::state::AppState;

/// Build a list query from raw query-string parameters.
///
/// Only the filters `kind` understands are forwarded.
///
/// # Errors
///
/// Returns `BadRequest` for a non-numeric page or limit, or an unknown status.
pub fn list_query(kind: ResourceKind, params: &HashMap<String, String>) -> Result<ListQuery> {
    let number = |key: &str| -> Result<Option<u32>> {
        params
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("{key} must be a positive number")))
            })
            .transpose()
    };

    let mut query = ListQuery::new();
    if let Some(page) = number("page")? {
        query = query.page(page);
    }
    if let Some(limit) = number("limit")? {
        query = query.limit(limit);
    }
    if let Some(search) = params.get("search") {
        query = query.search(search.as_str());
    }
    if let Some(status) = params.get("status").filter(|s| !s.trim().is_empty()) {
        let status = status
            .trim()
            .parse::<RecordStatus>()
            .map_err(AppError::BadRequest)?;
        query = query.status(status);
    }
    for key in kind.filter_keys() {
        query = query.filter_opt(*key, params.get(*key));
    }

    Ok(query)
}

/// List one page of a resource.
#[instrument(skip(state, admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    let query = list_query(kind, &params)?;

    let page = state
        .client_for(&admin)
        .list::<Value>(kind, &query)
        .await?;

    Ok(Json(json!({
        "data": page.items,
        "pagination": page.pagination,
    })))
}

/// Fetch one record.
#[instrument(skip(state, admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    let record: Value = state
        .client_for(&admin)
        .get(kind, &id)
        .await
        .map_err(|e| not_found(e, kind))?;

    Ok(Json(json!({ "data": record })))
}

/// Create a record.
#[instrument(skip(state, admin, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(resource): Path<String>,
    payload: ResourcePayload,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    let client = state.client_for(&admin);
    validate_write(&client, kind, &payload, WriteKind::Create, None).await?;

    let record: Value = client.create(kind, payload.into_body()).await?;
    tracing::info!(resource = %kind, "Created record");

    Ok((StatusCode::CREATED, Json(json!({ "data": record }))))
}

/// Replace a record.
#[instrument(skip(state, admin, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
    payload: ResourcePayload,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    let client = state.client_for(&admin);
    validate_write(&client, kind, &payload, WriteKind::Update, Some(&id)).await?;

    let record: Value = client
        .update(kind, &id, payload.into_body())
        .await
        .map_err(|e| not_found(e, kind))?;
    tracing::info!(resource = %kind, id = %id, "Updated record");

    Ok(Json(json!({ "data": record })))
}

/// Status change body.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: RecordStatus,
}

/// Set a record active or inactive.
#[instrument(skip(state, admin))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
    Json(form): Json<StatusForm>,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    let record: Value = state
        .client_for(&admin)
        .set_status(kind, &id, form.status)
        .await
        .map_err(|e| not_found(e, kind))?;
    tracing::info!(resource = %kind, id = %id, status = %form.status, "Changed status");

    Ok(Json(json!({ "data": record })))
}

/// Delete a record.
#[instrument(skip(state, admin))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let kind: ResourceKind = resource.parse()?;
    state
        .client_for(&admin)
        .delete(kind, &id)
        .await
        .map_err(|e| not_found(e, kind))?;
    tracing::info!(resource = %kind, id = %id, "Deleted record");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) fn not_found(err: GatewayError, kind: ResourceKind) -> AppError {
    if err.is_not_found() {
        AppError::NotFound(kind.label().to_string())
    } else {
        AppError::Gateway(err)
    }
}

/// Required fields, then SKU option-set uniqueness within the product.
async fn validate_write(
    client: &ApiClient,
    kind: ResourceKind,
    payload: &ResourcePayload,
    write: WriteKind,
    id: Option<&str>,
) -> Result<()> {
    let missing = missing_fields(kind, payload, write);
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    if kind != ResourceKind::ProductSkus {
        return Ok(());
    }

    let options = sku_options(payload)?;
    let product_id = payload
        .field("product_id")
        .map(ProductId::new)
        .ok_or_else(|| AppError::MissingFields(vec!["product_id"]))?;
    let existing: Vec<ProductSku> = client.product_skus(&product_id).await?;
    let editing = id.map(SkuId::new);

    check_sku_options(&existing, &options, editing.as_ref())
}
