//! `bazaar-cli resolve`: show which SKU a set of options lands on.

use std::fmt::Write as _;

use circuit_bazaar_core::catalog::{Product, ProductSku};
use circuit_bazaar_core::{OptionId, ProductId, Selection, VariationResolver};
use circuit_bazaar_gateway::ApiClient;

use super::CommandError;

/// Fetch the product and its SKUs, then resolve `options` against them.
///
/// # Errors
///
/// Returns an error if the backend call fails or an option id is not part
/// of the product's variations.
pub async fn run(
    client: &ApiClient,
    product_id: &str,
    options: &[String],
) -> Result<String, CommandError> {
    let product_id = ProductId::new(product_id);
    let (product, skus) = tokio::try_join!(
        client.product(&product_id),
        client.product_skus(&product_id)
    )?;

    let selection = selection_for(&product, options)?;
    Ok(render(&product, &skus, selection))
}

/// Map bare option ids onto the variation group that owns each one.
pub(crate) fn selection_for(
    product: &Product,
    options: &[String],
) -> Result<Selection, CommandError> {
    options
        .iter()
        .map(|raw| {
            let option = OptionId::new(raw.as_str());
            product
                .variations
                .iter()
                .find(|group| group.option(&option).is_some())
                .map(|group| (group.id.clone(), option))
                .ok_or_else(|| CommandError::UnknownOption(raw.clone()))
        })
        .collect()
}

pub(crate) fn render(product: &Product, skus: &[ProductSku], selection: Selection) -> String {
    let resolver = VariationResolver::new(skus).with_selection(selection);
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", product.name, product.id);
    match resolver.matching_sku().and_then(|id| skus.iter().find(|sku| &sku.id == id)) {
        Some(sku) => {
            let _ = writeln!(
                out,
                "resolved: {} {} @ {} [{}]",
                sku.id,
                sku.display_title(),
                sku.price,
                sku.stock_status().label()
            );
        }
        None => {
            let _ = writeln!(out, "resolved: none");
        }
    }
    if !resolver.selection().is_complete(&product.variations) {
        let _ = writeln!(out, "selection incomplete");
    }

    for group in resolver.option_states(&product.variations) {
        let _ = writeln!(out, "{}:", group.name);
        for option in group.options {
            let marker = if option.selected { '*' } else { ' ' };
            let availability = if option.available { "available" } else { "unavailable" };
            let _ = writeln!(out, "  {marker} {:<20} {availability}", option.name);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "phone",
            "name": "Phone X",
            "variations": [
                {"id": "color", "name": "Color", "options": [
                    {"id": "red", "name": "Red"}, {"id": "blue", "name": "Blue"}
                ]},
                {"id": "storage", "name": "Storage", "options": [
                    {"id": "64", "name": "64GB"}, {"id": "128", "name": "128GB"}
                ]}
            ]
        }))
        .unwrap()
    }

    fn skus() -> Vec<ProductSku> {
        serde_json::from_value(json!([
            {"id": "red-64", "product_id": "phone", "price": "499.00", "in_stock": true,
             "options": [{"variation_id": "color", "option_id": "red"},
                         {"variation_id": "storage", "option_id": "64"}]},
            {"id": "blue-128", "product_id": "phone", "price": "599.00", "in_stock": false,
             "options": [{"variation_id": "color", "option_id": "blue"},
                         {"variation_id": "storage", "option_id": "128"}]}
        ]))
        .unwrap()
    }

    #[test]
    fn test_selection_maps_options_to_groups() {
        let selection = selection_for(&product(), &["128".to_string()]).unwrap();
        assert_eq!(
            selection.get(&circuit_bazaar_core::VariationId::new("storage")),
            Some(&OptionId::new("128"))
        );
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = selection_for(&product(), &["green".to_string()]).unwrap_err();
        assert!(matches!(err, CommandError::UnknownOption(id) if id == "green"));
    }

    #[test]
    fn test_render_reports_resolution_and_availability() {
        let product = product();
        let selection = selection_for(&product, &["blue".to_string()]).unwrap();
        let out = render(&product, &skus(), selection);

        assert!(out.contains("resolved: blue-128"));
        assert!(out.contains("selection incomplete"));
        let red = out.lines().find(|line| line.contains("Red")).unwrap();
        assert!(red.ends_with("available"));
        let small = out.lines().find(|line| line.contains("64GB")).unwrap();
        assert!(small.ends_with("unavailable"));
        let blue = out.lines().find(|line| line.contains("Blue")).unwrap();
        assert!(blue.trim_start().starts_with('*'));
    }

    #[test]
    fn test_render_without_match() {
        let product = product();
        let out = render(&product, &[], Selection::new());
        assert!(out.contains("resolved: none"));
    }
}
