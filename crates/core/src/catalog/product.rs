//! Products, their variation schema, and the SKUs that instantiate it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    BrandId, CategoryId, InnerCategoryId, OptionId, ProductId, RecordStatus, SkuId, StockStatus,
    SubCategoryId, VariationId,
};

/// A product as listed in the catalog.
///
/// Prices live on SKUs. Listing payloads carry a denormalized
/// `starting_price` and `default_sku_id` so cards can render without a
/// second round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sub_category_id: Option<SubCategoryId>,
    #[serde(default)]
    pub inner_category_id: Option<InnerCategoryId>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: RecordStatus,
    /// Variation axes, in display order.
    #[serde(default)]
    pub variations: Vec<VariationGroup>,
    #[serde(default)]
    pub starting_price: Option<Decimal>,
    #[serde(default)]
    pub default_sku_id: Option<SkuId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// First image, used as the card thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Look up a variation group by id.
    #[must_use]
    pub fn variation(&self, id: &VariationId) -> Option<&VariationGroup> {
        self.variations.iter().find(|group| &group.id == id)
    }
}

/// A named axis of customization (e.g., "Color") with a fixed option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationGroup {
    pub id: VariationId,
    pub name: String,
    #[serde(default)]
    pub options: Vec<VariationOption>,
}

impl VariationGroup {
    /// Look up an option of this group by id.
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&VariationOption> {
        self.options.iter().find(|option| &option.id == id)
    }
}

/// One concrete choice within a variation group (e.g., "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationOption {
    pub id: OptionId,
    pub name: String,
}

/// A (group, option) pair fixed by a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkuOption {
    pub variation_id: VariationId,
    pub option_id: OptionId,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSku {
    pub id: SkuId,
    pub product_id: ProductId,
    /// Variant title, e.g. "Phone X - Red / 64GB".
    #[serde(default)]
    pub title: String,
    /// Merchant stock-keeping code.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub options: Vec<SkuOption>,
    pub price: Decimal,
    /// Compare-at price shown struck through when higher than `price`.
    #[serde(default)]
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub in_stock: bool,
    /// Maximum quantity of this SKU in a single order.
    #[serde(default)]
    pub order_limit: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl ProductSku {
    /// Option ids fixed by this SKU.
    pub fn option_ids(&self) -> impl Iterator<Item = &OptionId> {
        self.options.iter().map(|pair| &pair.option_id)
    }

    /// The option this SKU fixes for `variation`, if any.
    #[must_use]
    pub fn option_for(&self, variation: &VariationId) -> Option<&OptionId> {
        self.options
            .iter()
            .find(|pair| &pair.variation_id == variation)
            .map(|pair| &pair.option_id)
    }

    /// Title for carts and receipts, falling back to the product name.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.product_name.as_deref().unwrap_or(self.id.as_str())
        } else {
            &self.title
        }
    }

    /// Compare-at price, only when it is actually a discount.
    #[must_use]
    pub fn discounted_from(&self) -> Option<Decimal> {
        self.list_price.filter(|list| *list > self.price)
    }

    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_flag(self.in_stock)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_sku_with_numeric_price() {
        let sku: ProductSku = serde_json::from_value(json!({
            "id": "sku-a",
            "product_id": "phone",
            "price": 499.99,
            "list_price": "549.00",
            "in_stock": true,
            "order_limit": 2,
            "options": [
                {"variation_id": "color", "option_id": "red"},
                {"variation_id": "storage", "option_id": "64gb"}
            ]
        }))
        .unwrap();

        assert_eq!(sku.price, Decimal::new(49_999, 2));
        assert_eq!(sku.discounted_from(), Some(Decimal::new(549, 0)));
        assert_eq!(sku.option_for(&VariationId::new("storage")), Some(&OptionId::new("64gb")));
        assert_eq!(sku.option_ids().count(), 2);
        assert_eq!(sku.display_title(), "sku-a");
    }

    #[test]
    fn test_decode_rejects_missing_price() {
        let result = serde_json::from_value::<ProductSku>(json!({
            "id": "sku-a",
            "product_id": "phone"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_price_below_price_is_not_a_discount() {
        let sku: ProductSku = serde_json::from_value(json!({
            "id": "s", "product_id": "p", "price": 10, "list_price": 8
        }))
        .unwrap();
        assert_eq!(sku.discounted_from(), None);
    }
}
