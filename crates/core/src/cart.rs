//! The shopping cart aggregate.
//!
//! A [`Cart`] is a plain owned value: the storefront loads it from the
//! visitor's session, applies one operation, and stores it back. Line items
//! are keyed by SKU id and keep insertion order for display. The total is
//! derived on every read and never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::ProductSku;
use crate::types::{CurrencyCode, Price, SkuId};

/// Display snapshot of a SKU at the moment it was added.
///
/// Has no quantity: adding the same SKU again bumps the existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub sku_id: SkuId,
    pub title: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    /// Per-order maximum carried from the SKU; checked at checkout.
    pub order_limit: Option<u32>,
}

impl From<&ProductSku> for NewCartItem {
    fn from(sku: &ProductSku) -> Self {
        Self {
            sku_id: sku.id.clone(),
            title: sku.display_title().to_owned(),
            unit_price: sku.price,
            image: sku.images.first().cloned(),
            category: sku.category_name.clone(),
            order_limit: sku.order_limit,
        }
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub sku_id: SkuId,
    pub title: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    pub order_limit: Option<u32>,
    /// Always at least 1; a line that would reach 0 is removed instead.
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Whether the quantity exceeds the SKU's order limit.
    #[must_use]
    pub fn exceeds_order_limit(&self) -> bool {
        self.order_limit.is_some_and(|limit| self.quantity > limit)
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by SKU id.
    #[must_use]
    pub fn get(&self, sku_id: &SkuId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.sku_id == sku_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines (the badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Σ(unit price × quantity), recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The total as a [`Price`] in the store currency.
    #[must_use]
    pub fn total_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.total(), currency)
    }

    /// Add one unit of `item`.
    ///
    /// If the SKU is already in the cart its quantity goes up by one and the
    /// snapshot stored on first add is kept as is. Otherwise a new line with
    /// quantity 1 is appended.
    pub fn add(&mut self, item: NewCartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.sku_id == item.sku_id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem {
            sku_id: item.sku_id,
            title: item.title,
            unit_price: item.unit_price,
            image: item.image,
            category: item.category,
            order_limit: item.order_limit,
            quantity: 1,
        });
    }

    /// Drop the line for `sku_id`. Absent ids are ignored.
    pub fn remove(&mut self, sku_id: &SkuId) {
        self.items.retain(|item| &item.sku_id != sku_id);
    }

    /// Set the quantity of a line to exactly `quantity`.
    ///
    /// `quantity <= 0` removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, sku_id: &SkuId, quantity: i64) {
        if quantity <= 0 {
            self.remove(sku_id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| &i.sku_id == sku_id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines whose quantity is above their SKU's order limit.
    pub fn over_limit(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|item| item.exceeds_order_limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64) -> NewCartItem {
        NewCartItem {
            sku_id: SkuId::new(id),
            title: format!("Item {id}"),
            unit_price: Decimal::new(price, 0),
            image: None,
            category: Some("Phones".to_string()),
            order_limit: None,
        }
    }

    #[test]
    fn test_cart_walkthrough() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);

        cart.add(item("x", 10));
        assert_eq!(cart.get(&SkuId::new("x")).map(|i| i.quantity), Some(1));
        assert_eq!(cart.total(), Decimal::new(10, 0));

        cart.add(item("x", 10));
        assert_eq!(cart.get(&SkuId::new("x")).map(|i| i.quantity), Some(2));
        assert_eq!(cart.total(), Decimal::new(20, 0));

        cart.update_quantity(&SkuId::new("x"), 5);
        assert_eq!(cart.total(), Decimal::new(50, 0));

        cart.remove(&SkuId::new("x"));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_repeated_adds_count_calls() {
        for calls in 1..=12_u32 {
            let mut cart = Cart::new();
            for _ in 0..calls {
                cart.add(item("phone", 7));
            }
            assert_eq!(cart.line_count(), 1);
            assert_eq!(cart.item_count(), calls);
            assert_eq!(cart.total(), Decimal::new(7, 0) * Decimal::from(calls));
        }
    }

    #[test]
    fn test_re_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add(item("x", 10));

        let mut changed = item("x", 99);
        changed.title = "Renamed".to_string();
        cart.add(changed);

        let line = cart.get(&SkuId::new("x")).cloned();
        assert_eq!(line.as_ref().map(|l| l.title.as_str()), Some("Item x"));
        assert_eq!(line.map(|l| l.unit_price), Some(Decimal::new(10, 0)));
        assert_eq!(cart.total(), Decimal::new(20, 0));
    }

    #[test]
    fn test_update_to_zero_matches_remove() {
        let mut via_update = Cart::new();
        via_update.add(item("a", 3));
        via_update.add(item("b", 4));
        let mut via_remove = via_update.clone();

        via_update.update_quantity(&SkuId::new("a"), 0);
        via_remove.remove(&SkuId::new("a"));
        assert_eq!(via_update, via_remove);

        let mut negative = Cart::new();
        negative.add(item("b", 4));
        negative.add(item("a", 3));
        negative.update_quantity(&SkuId::new("a"), -3);
        assert_eq!(negative.items().len(), 1);
        assert_eq!(negative.total(), Decimal::new(4, 0));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add(item("a", 3));
        let before = cart.clone();

        cart.remove(&SkuId::new("missing"));
        cart.remove(&SkuId::new("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(item("a", 3));
        let before = cart.clone();
        cart.update_quantity(&SkuId::new("ghost"), 4);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add(item("c", 1));
        cart.add(item("a", 1));
        cart.add(item("b", 1));
        cart.add(item("c", 1));

        let order: Vec<&str> = cart.items().iter().map(|i| i.sku_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_order_limit_is_reported_not_enforced() {
        let mut cart = Cart::new();
        let mut limited = item("tv", 500);
        limited.order_limit = Some(1);
        cart.add(limited.clone());
        assert_eq!(cart.over_limit().count(), 0);

        cart.add(limited);
        assert_eq!(cart.item_count(), 2);
        let over: Vec<&str> = cart.over_limit().map(|i| i.sku_id.as_str()).collect();
        assert_eq!(over, vec!["tv"]);
    }

    #[test]
    fn test_clear_and_total_price() {
        let mut cart = Cart::new();
        cart.add(item("a", 3));
        cart.add(item("b", 4));
        assert_eq!(
            cart.total_price(CurrencyCode::USD),
            Price::new(Decimal::new(7, 0), CurrencyCode::USD)
        );

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_snapshot_from_sku() {
        let sku = ProductSku {
            id: SkuId::new("sku-a"),
            product_id: crate::types::ProductId::new("phone"),
            title: String::new(),
            code: None,
            options: Vec::new(),
            price: Decimal::new(19_900, 2),
            list_price: None,
            in_stock: true,
            order_limit: Some(3),
            images: vec!["front.jpg".to_string(), "back.jpg".to_string()],
            product_name: Some("Phone".to_string()),
            category_name: Some("Mobiles".to_string()),
            status: crate::types::RecordStatus::Active,
        };

        let snapshot = NewCartItem::from(&sku);
        assert_eq!(snapshot.title, "Phone");
        assert_eq!(snapshot.image.as_deref(), Some("front.jpg"));
        assert_eq!(snapshot.category.as_deref(), Some("Mobiles"));
        assert_eq!(snapshot.order_limit, Some(3));
    }
}
