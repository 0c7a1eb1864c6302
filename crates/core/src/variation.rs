//! Variation selection and SKU resolution.
//!
//! A product exposes variation groups (Color, Storage, ...) and a list of
//! SKUs, each fixing one option in some of those groups. The shopper builds
//! a [`Selection`] one click at a time; the [`VariationResolver`] answers two
//! questions about it:
//!
//! - which SKU does the selection resolve to, if any
//! - which options can still be picked without reaching a dead end
//!
//! Matching is by containment: a SKU matches when its option ids include
//! every option id of the selection. A partial selection therefore resolves
//! to the first SKU (in backend order) that extends it.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{ProductSku, SkuOption, VariationGroup};
use crate::types::{OptionId, SkuId, VariationId};

/// Partial map from variation group to the single chosen option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<VariationId, OptionId>);

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The full option set of a SKU, used to seed the detail page.
    #[must_use]
    pub fn from_sku(sku: &ProductSku) -> Self {
        sku.options
            .iter()
            .map(|pair| (pair.variation_id.clone(), pair.option_id.clone()))
            .collect()
    }

    /// Option chosen for `variation`, if any.
    #[must_use]
    pub fn get(&self, variation: &VariationId) -> Option<&OptionId> {
        self.0.get(variation)
    }

    /// Whether `option` is the current choice for `variation`.
    #[must_use]
    pub fn is_selected(&self, variation: &VariationId, option: &OptionId) -> bool {
        self.get(variation) == Some(option)
    }

    /// Toggle `option` in `variation`.
    ///
    /// Choosing the option that is already selected clears the group;
    /// anything else replaces the group's previous choice. Returns `true`
    /// when the option ends up selected.
    pub fn toggle(&mut self, variation: VariationId, option: OptionId) -> bool {
        if self.0.get(&variation) == Some(&option) {
            self.0.remove(&variation);
            false
        } else {
            self.0.insert(variation, option);
            true
        }
    }

    /// A copy of this selection with `variation` pinned to `option`.
    #[must_use]
    pub fn pinned(&self, variation: &VariationId, option: &OptionId) -> Self {
        let mut hypothetical = self.clone();
        hypothetical.0.insert(variation.clone(), option.clone());
        hypothetical
    }

    /// The chosen option ids.
    pub fn option_ids(&self) -> impl Iterator<Item = &OptionId> {
        self.0.values()
    }

    /// (group, option) pairs in group-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariationId, &OptionId)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every group of the product has a choice.
    #[must_use]
    pub fn is_complete(&self, groups: &[VariationGroup]) -> bool {
        groups.iter().all(|group| self.0.contains_key(&group.id))
    }
}

impl FromIterator<(VariationId, OptionId)> for Selection {
    fn from_iter<T: IntoIterator<Item = (VariationId, OptionId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Render state of one option button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionState {
    pub option_id: OptionId,
    pub name: String,
    pub selected: bool,
    /// Picking this option still leads to at least one SKU.
    pub available: bool,
}

/// Render state of one variation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupState {
    pub variation_id: VariationId,
    pub name: String,
    pub options: Vec<OptionState>,
}

#[derive(Debug, Clone)]
struct Candidate {
    sku_id: SkuId,
    option_ids: HashSet<OptionId>,
}

impl Candidate {
    fn contains_all<'a>(&self, mut required: impl Iterator<Item = &'a OptionId>) -> bool {
        required.all(|id| self.option_ids.contains(id))
    }
}

/// Resolves selections against one product's SKUs.
#[derive(Debug, Clone)]
pub struct VariationResolver {
    candidates: Vec<Candidate>,
    selection: Selection,
}

impl VariationResolver {
    /// Build a resolver over `skus`, keeping their order.
    pub fn new<'a>(skus: impl IntoIterator<Item = &'a ProductSku>) -> Self {
        let candidates = skus
            .into_iter()
            .map(|sku| Candidate {
                sku_id: sku.id.clone(),
                option_ids: sku.option_ids().cloned().collect(),
            })
            .collect();

        Self {
            candidates,
            selection: Selection::new(),
        }
    }

    /// Replace the current selection.
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggle an option. Inconsistent combinations are accepted; they only
    /// show up as unavailable options and an unresolved SKU.
    pub fn select_option(&mut self, variation: VariationId, option: OptionId) {
        self.selection.toggle(variation, option);
    }

    /// Whether picking `option` in `variation` keeps at least one SKU
    /// reachable from the current selection.
    #[must_use]
    pub fn is_option_available(&self, variation: &VariationId, option: &OptionId) -> bool {
        let hypothetical = self.selection.pinned(variation, option);
        self.candidates
            .iter()
            .any(|candidate| candidate.contains_all(hypothetical.option_ids()))
    }

    /// First SKU whose options contain every option of `selection`.
    #[must_use]
    pub fn resolve_matching_sku(&self, selection: &Selection) -> Option<&SkuId> {
        self.candidates
            .iter()
            .find(|candidate| candidate.contains_all(selection.option_ids()))
            .map(|candidate| &candidate.sku_id)
    }

    /// [`resolve_matching_sku`](Self::resolve_matching_sku) for the current selection.
    #[must_use]
    pub fn matching_sku(&self) -> Option<&SkuId> {
        self.resolve_matching_sku(&self.selection)
    }

    /// The SKU the view should switch to, if the selection now resolves to
    /// something other than `displayed`.
    ///
    /// `None` means keep showing `displayed`, either because it still
    /// matches or because nothing matches yet.
    #[must_use]
    pub fn next_sku(&self, displayed: &SkuId) -> Option<&SkuId> {
        self.matching_sku().filter(|resolved| *resolved != displayed)
    }

    /// Selected/available flags for every option of `groups`.
    #[must_use]
    pub fn option_states(&self, groups: &[VariationGroup]) -> Vec<GroupState> {
        groups
            .iter()
            .map(|group| GroupState {
                variation_id: group.id.clone(),
                name: group.name.clone(),
                options: group
                    .options
                    .iter()
                    .map(|option| OptionState {
                        option_id: option.id.clone(),
                        name: option.name.clone(),
                        selected: self.selection.is_selected(&group.id, &option.id),
                        available: self.is_option_available(&group.id, &option.id),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Find a SKU of the same product with exactly the `options` pair set.
///
/// Two SKUs with identical pairs would make selection ambiguous, so admin
/// writes are rejected when this returns `Some`. `exclude` skips the SKU
/// being edited.
#[must_use]
pub fn duplicate_option_set<'a>(
    skus: &'a [ProductSku],
    options: &[SkuOption],
    exclude: Option<&SkuId>,
) -> Option<&'a SkuId> {
    let wanted: HashSet<&SkuOption> = options.iter().collect();
    skus.iter()
        .filter(|sku| Some(&sku.id) != exclude)
        .find(|sku| sku.options.iter().collect::<HashSet<_>>() == wanted)
        .map(|sku| &sku.id)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::VariationOption;
    use crate::types::{ProductId, RecordStatus};

    fn sku(id: &str, pairs: &[(&str, &str)]) -> ProductSku {
        ProductSku {
            id: SkuId::new(id),
            product_id: ProductId::new("phone"),
            title: id.to_string(),
            code: None,
            options: pairs
                .iter()
                .map(|(group, option)| SkuOption {
                    variation_id: VariationId::new(*group),
                    option_id: OptionId::new(*option),
                })
                .collect(),
            price: Decimal::new(100, 0),
            list_price: None,
            in_stock: true,
            order_limit: None,
            images: Vec::new(),
            product_name: None,
            category_name: None,
            status: RecordStatus::Active,
        }
    }

    fn group(id: &str, options: &[&str]) -> VariationGroup {
        VariationGroup {
            id: VariationId::new(id),
            name: id.to_uppercase(),
            options: options
                .iter()
                .map(|o| VariationOption {
                    id: OptionId::new(*o),
                    name: o.to_string(),
                })
                .collect(),
        }
    }

    /// Phone: Color={red,blue}, Storage={64gb,128gb};
    /// SKU-A = red/64gb, SKU-B = blue/128gb.
    fn phone() -> (Vec<VariationGroup>, Vec<ProductSku>) {
        (
            vec![
                group("color", &["red", "blue"]),
                group("storage", &["64gb", "128gb"]),
            ],
            vec![
                sku("SKU-A", &[("color", "red"), ("storage", "64gb")]),
                sku("SKU-B", &[("color", "blue"), ("storage", "128gb")]),
            ],
        )
    }

    fn v(id: &str) -> VariationId {
        VariationId::new(id)
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id)
    }

    #[test]
    fn test_phone_scenario() {
        let (_, skus) = phone();
        let mut resolver = VariationResolver::new(&skus);

        resolver.select_option(v("color"), o("red"));
        assert!(!resolver.is_option_available(&v("storage"), &o("128gb")));
        assert!(resolver.is_option_available(&v("storage"), &o("64gb")));

        resolver.select_option(v("storage"), o("64gb"));
        assert_eq!(resolver.matching_sku(), Some(&SkuId::new("SKU-A")));
    }

    #[test]
    fn test_full_option_set_resolves_to_its_sku() {
        let (_, skus) = phone();
        let resolver = VariationResolver::new(&skus);
        for s in &skus {
            assert_eq!(
                resolver.resolve_matching_sku(&Selection::from_sku(s)),
                Some(&s.id)
            );
        }
    }

    #[test]
    fn test_option_in_no_sku_is_unavailable() {
        let (_, skus) = phone();
        let resolver = VariationResolver::new(&skus);
        assert!(!resolver.is_option_available(&v("color"), &o("green")));

        let picked = resolver.with_selection(Selection::from_sku(&skus[1]));
        assert!(!picked.is_option_available(&v("storage"), &o("256gb")));
    }

    #[test]
    fn test_toggle_same_option_deselects() {
        let mut selection = Selection::new();
        assert!(selection.toggle(v("color"), o("red")));
        assert!(!selection.toggle(v("color"), o("red")));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_replaces_choice_in_group() {
        let mut selection = Selection::new();
        selection.toggle(v("color"), o("red"));
        selection.toggle(v("color"), o("blue"));
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get(&v("color")), Some(&o("blue")));
    }

    #[test]
    fn test_inconsistent_selection_is_accepted_but_unresolved() {
        let (_, skus) = phone();
        let mut resolver = VariationResolver::new(&skus);
        resolver.select_option(v("color"), o("red"));
        resolver.select_option(v("storage"), o("128gb"));

        assert_eq!(resolver.selection().len(), 2);
        assert_eq!(resolver.matching_sku(), None);
        assert_eq!(resolver.next_sku(&SkuId::new("SKU-A")), None);
    }

    #[test]
    fn test_partial_selection_resolves_by_containment() {
        let (_, skus) = phone();
        let mut resolver = VariationResolver::new(&skus);
        resolver.select_option(v("storage"), o("128gb"));
        assert_eq!(resolver.matching_sku(), Some(&SkuId::new("SKU-B")));
    }

    #[test]
    fn test_first_match_wins_in_stored_order() {
        let skus = vec![
            sku("first", &[("color", "red"), ("storage", "64gb")]),
            sku("second", &[("color", "red"), ("storage", "128gb")]),
        ];
        let mut resolver = VariationResolver::new(&skus);
        resolver.select_option(v("color"), o("red"));
        assert_eq!(resolver.matching_sku(), Some(&SkuId::new("first")));
    }

    #[test]
    fn test_next_sku_only_reports_changes() {
        let (_, skus) = phone();
        let resolver = VariationResolver::new(&skus).with_selection(Selection::from_sku(&skus[0]));
        assert_eq!(resolver.next_sku(&SkuId::new("SKU-A")), None);

        let mut resolver = resolver;
        resolver.select_option(v("color"), o("blue"));
        resolver.select_option(v("storage"), o("128gb"));
        assert_eq!(
            resolver.next_sku(&SkuId::new("SKU-A")),
            Some(&SkuId::new("SKU-B"))
        );
    }

    #[test]
    fn test_option_states() {
        let (groups, skus) = phone();
        let mut resolver = VariationResolver::new(&skus);
        resolver.select_option(v("color"), o("red"));

        let states = resolver.option_states(&groups);
        assert_eq!(states.len(), 2);

        let color = &states[0];
        assert!(color.options[0].selected);
        // Switching color is always possible: blue/128gb exists.
        assert!(color.options[1].available);

        let storage = &states[1];
        assert!(storage.options[0].available);
        assert!(!storage.options[1].available);
        assert!(!resolver.selection().is_complete(&groups));
    }

    #[test]
    fn test_selection_serializes_as_map() {
        let selection: Selection = [(v("color"), o("red"))].into_iter().collect();
        let json = serde_json::to_value(&selection).ok();
        assert_eq!(json, Some(serde_json::json!({"color": "red"})));
    }

    #[test]
    fn test_duplicate_option_set() {
        let (_, skus) = phone();
        let proposed = vec![
            SkuOption {
                variation_id: v("storage"),
                option_id: o("64gb"),
            },
            SkuOption {
                variation_id: v("color"),
                option_id: o("red"),
            },
        ];
        assert_eq!(
            duplicate_option_set(&skus, &proposed, None),
            Some(&SkuId::new("SKU-A"))
        );
        assert_eq!(
            duplicate_option_set(&skus, &proposed, Some(&SkuId::new("SKU-A"))),
            None
        );
        assert_eq!(duplicate_option_set(&skus, &proposed[..1], None), None);
    }
}
