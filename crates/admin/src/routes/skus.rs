//! Product SKU helpers for the variant editor.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use circuit_bazaar_core::catalog::SkuOption;
use circuit_bazaar_core::{ProductId, SkuId, duplicate_option_set};
use circuit_bazaar_gateway::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::resources::not_found;
use crate::state::AppState;

/// Proposed option set for a new or edited SKU.
#[derive(Debug, Deserialize)]
pub struct ValidateForm {
    #[serde(default)]
    pub options: Vec<SkuOption>,
    /// The SKU being edited, which may keep its own option set.
    #[serde(default)]
    pub sku_id: Option<String>,
}

/// Outcome of an option-set check.
#[derive(Debug, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub duplicate_sku_id: Option<SkuId>,
}

fn require_products(resource: &str) -> Result<()> {
    match resource.parse::<ResourceKind>()? {
        ResourceKind::Products => Ok(()),
        other => Err(AppError::NotFound(format!("{} SKUs", other.label()))),
    }
}

/// SKUs of a product.
#[instrument(skip(state, admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    require_products(&resource)?;
    let skus = state
        .client_for(&admin)
        .product_skus(&ProductId::new(id))
        .await
        .map_err(|e| not_found(e, ResourceKind::Products))?;

    Ok(Json(json!({ "data": skus })))
}

/// Check whether an option set is free within the product.
#[instrument(skip(state, admin))]
pub async fn validate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((resource, id)): Path<(String, String)>,
    Json(form): Json<ValidateForm>,
) -> Result<Json<Validation>> {
    require_products(&resource)?;
    let skus = state
        .client_for(&admin)
        .product_skus(&ProductId::new(id))
        .await
        .map_err(|e| not_found(e, ResourceKind::Products))?;

    let editing = form.sku_id.map(SkuId::new);
    let duplicate = duplicate_option_set(&skus, &form.options, editing.as_ref()).cloned();

    Ok(Json(Validation {
        valid: duplicate.is_none(),
        duplicate_sku_id: duplicate,
    }))
}
