//! Local checks run before a write reaches the backend.

use std::collections::HashSet;

use circuit_bazaar_core::catalog::{ProductSku, SkuOption};
use circuit_bazaar_core::{SkuId, duplicate_option_set};
use circuit_bazaar_gateway::ResourceKind;

use crate::error::AppError;
use crate::services::ResourcePayload;

/// Whether a write creates a record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

/// Fields every write of `kind` must carry.
#[must_use]
pub const fn required_fields(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Categories | ResourceKind::Brands => &["name"],
        ResourceKind::SubCategories => &["name", "category_id"],
        ResourceKind::InnerCategories => &["name", "category_id", "sub_category_id"],
        ResourceKind::Products => &["name", "category_id"],
        ResourceKind::ProductSkus => &["product_id", "price"],
        ResourceKind::Banners | ResourceKind::Carousels => &["title", "image"],
        ResourceKind::Blogs => &["title", "content"],
    }
}

/// Required fields absent from `payload`.
///
/// Updates may leave the image out; the backend keeps the stored one.
#[must_use]
pub fn missing_fields(
    kind: ResourceKind,
    payload: &ResourcePayload,
    write: WriteKind,
) -> Vec<&'static str> {
    required_fields(kind)
        .iter()
        .copied()
        .filter(|field| !(write == WriteKind::Update && *field == "image"))
        .filter(|field| !payload.has_value(field))
        .collect()
}

/// Option pairs of a SKU write.
///
/// # Errors
///
/// Returns `BadRequest` if `options` is present but is not a list of
/// `{variation_id, option_id}` pairs, or if it names a variation twice.
pub fn sku_options(payload: &ResourcePayload) -> Result<Vec<SkuOption>, AppError> {
    let invalid = |e: serde_json::Error| AppError::BadRequest(format!("Invalid options: {e}"));

    let options: Vec<SkuOption> = match payload.json_field("options").map_err(invalid)? {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(invalid)?,
    };

    let mut seen = HashSet::with_capacity(options.len());
    if let Some(repeated) = options.iter().find(|pair| !seen.insert(&pair.variation_id)) {
        return Err(AppError::BadRequest(format!(
            "Invalid options: variation {} is chosen more than once",
            repeated.variation_id
        )));
    }

    Ok(options)
}

/// Reject an option set that another SKU of the product already uses.
///
/// # Errors
///
/// Returns `Conflict` naming the SKU that holds the same option set.
pub fn check_sku_options(
    existing: &[ProductSku],
    options: &[SkuOption],
    editing: Option<&SkuId>,
) -> Result<(), AppError> {
    match duplicate_option_set(existing, options, editing) {
        Some(duplicate) => Err(AppError::Conflict(format!(
            "SKU {duplicate} already has this option combination"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use circuit_bazaar_core::{OptionId, VariationId};
    use circuit_bazaar_gateway::MultipartForm;
    use serde_json::json;

    use super::*;

    fn pair(variation: &str, option: &str) -> SkuOption {
        SkuOption {
            variation_id: VariationId::new(variation),
            option_id: OptionId::new(option),
        }
    }

    fn sku(id: &str, options: Vec<SkuOption>) -> ProductSku {
        serde_json::from_value(json!({
            "id": id,
            "product_id": "phone",
            "price": 10,
            "options": options
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_fields_on_create_and_update() {
        let payload = ResourcePayload::Json(json!({ "title": "Hero" }));
        assert_eq!(
            missing_fields(ResourceKind::Banners, &payload, WriteKind::Create),
            vec!["image"]
        );
        assert!(missing_fields(ResourceKind::Banners, &payload, WriteKind::Update).is_empty());

        let payload = ResourcePayload::Json(json!({ "name": "Chargers" }));
        assert_eq!(
            missing_fields(ResourceKind::InnerCategories, &payload, WriteKind::Create),
            vec!["category_id", "sub_category_id"]
        );
    }

    #[test]
    fn test_sku_options_parsing() {
        let payload = ResourcePayload::Json(json!({
            "options": [{ "variation_id": "color", "option_id": "red" }]
        }));
        assert_eq!(sku_options(&payload).unwrap(), vec![pair("color", "red")]);

        let payload = ResourcePayload::Json(json!({}));
        assert!(sku_options(&payload).unwrap().is_empty());

        let payload = ResourcePayload::Json(json!({ "options": "red" }));
        assert!(matches!(sku_options(&payload), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_sku_options_reject_repeated_variation() {
        let payload = ResourcePayload::Json(json!({
            "options": [
                { "variation_id": "color", "option_id": "red" },
                { "variation_id": "color", "option_id": "blue" }
            ]
        }));
        assert!(matches!(
            sku_options(&payload),
            Err(AppError::BadRequest(ref message)) if message.contains("color")
        ));
    }

    #[test]
    fn test_sku_options_reject_malformed_multipart_text() {
        let payload = ResourcePayload::Multipart(
            MultipartForm::new()
                .text("product_id", "phone")
                .text("options", "color=red,storage=64"),
        );
        assert!(matches!(sku_options(&payload), Err(AppError::BadRequest(_))));

        let payload = ResourcePayload::Multipart(MultipartForm::new().text(
            "options",
            r#"[{"variation_id":"storage","option_id":"64"}]"#,
        ));
        assert_eq!(sku_options(&payload).unwrap(), vec![pair("storage", "64")]);
    }

    #[test]
    fn test_duplicate_option_set_is_a_conflict() {
        let existing = vec![
            sku("red-64", vec![pair("color", "red"), pair("storage", "64")]),
            sku("blue-64", vec![pair("color", "blue"), pair("storage", "64")]),
        ];
        let proposed = [pair("storage", "64"), pair("color", "red")];

        assert!(matches!(
            check_sku_options(&existing, &proposed, None),
            Err(AppError::Conflict(ref message)) if message.contains("red-64")
        ));
        assert!(check_sku_options(&existing, &proposed, Some(&SkuId::new("red-64"))).is_ok());
        assert!(check_sku_options(&existing, &[pair("color", "green")], None).is_ok());
    }
}
