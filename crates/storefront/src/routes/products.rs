//! Product route handlers.
//!
//! The detail page renders a variant panel: the variation groups with each
//! option's selected/available state, plus the SKU currently shown. Option
//! clicks post the current selection to `/products/{id}/select`; the
//! response is a fresh panel, and when the selection resolves to a different
//! SKU the visible URL is replaced (not pushed) with that SKU's URL.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use circuit_bazaar_core::catalog::{Product, ProductSku};
use circuit_bazaar_core::{
    CurrencyCode, GroupState, OptionId, Price, ProductId, RecordStatus, Selection, SkuId,
    VariationId, VariationResolver,
};
use circuit_bazaar_gateway::ListQuery;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::{PageChrome, PaginationView, empty_string_as_none, is_htmx};
use crate::state::AppState;

/// Products per listing page.
const PAGE_SIZE: u32 = 12;

// =============================================================================
// View Data
// =============================================================================

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub url: String,
    pub name: String,
    pub image: Option<String>,
    pub price: Option<String>,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            url: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            name: product.name.clone(),
            image: product.thumbnail().map(str::to_string),
            price: product
                .starting_price
                .map(|amount| Price::new(amount, currency).display()),
        }
    }
}

/// SKU display data for templates.
#[derive(Clone)]
pub struct SkuView {
    pub id: String,
    pub title: String,
    pub code: Option<String>,
    pub price: String,
    pub list_price: Option<String>,
    pub in_stock: bool,
    pub stock_label: &'static str,
    pub order_limit: Option<u32>,
    pub images: Vec<String>,
}

impl SkuView {
    #[must_use]
    pub fn new(sku: &ProductSku, currency: CurrencyCode) -> Self {
        Self {
            id: sku.id.to_string(),
            title: sku.display_title().to_string(),
            code: sku.code.clone(),
            price: Price::new(sku.price, currency).display(),
            list_price: sku
                .discounted_from()
                .map(|amount| Price::new(amount, currency).display()),
            in_stock: sku.in_stock,
            stock_label: sku.stock_status().label(),
            order_limit: sku.order_limit,
            images: sku.images.clone(),
        }
    }
}

/// Variant panel fragment: options plus the SKU on display.
#[derive(Template, WebTemplate)]
#[template(path = "partials/variant_panel.html")]
pub struct VariantPanelTemplate {
    pub product_id: String,
    pub groups: Vec<GroupState>,
    /// Current selection, JSON-encoded into a hidden input.
    pub selection_json: String,
    pub sku: Option<SkuView>,
    /// The selection matches no SKU; the previous SKU stays on display.
    pub unresolved: bool,
    /// The SKU on display is in stock and is exactly what the shopper picked.
    pub purchasable: bool,
}

impl VariantPanelTemplate {
    fn new(
        product: &Product,
        resolver: &VariationResolver,
        sku: Option<&ProductSku>,
        currency: CurrencyCode,
    ) -> Self {
        let selection = resolver.selection();
        Self {
            product_id: product.id.to_string(),
            groups: resolver.option_states(&product.variations),
            selection_json: serde_json::to_string(selection).unwrap_or_else(|_| "{}".to_string()),
            sku: sku.map(|sku| SkuView::new(sku, currency)),
            unresolved: !selection.is_empty() && resolver.matching_sku().is_none(),
            purchasable: sku
                .is_some_and(|sku| sku.in_stock && *selection == Selection::from_sku(sku)),
        }
    }

    fn render_html(&self) -> Result<String> {
        self.render()
            .map_err(|e| AppError::Internal(format!("template error: {e}")))
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductCardView>,
    pub pagination: PaginationView,
    pub search: String,
    pub stale: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub name: String,
    pub description: String,
    pub images: Vec<String>,
    pub panel_html: String,
}

// =============================================================================
// Listing
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub sub_category_id: Option<String>,
    #[serde(default)]
    pub inner_category_id: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
}

impl ListingParams {
    fn filters(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("category_id", self.category_id.as_deref()),
            ("sub_category_id", self.sub_category_id.as_deref()),
            ("inner_category_id", self.inner_category_id.as_deref()),
            ("brand_id", self.brand_id.as_deref()),
        ]
    }

    #[must_use]
    pub fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::new()
            .page(self.page.unwrap_or(1))
            .limit(self.limit.unwrap_or(PAGE_SIZE))
            .search(self.search.clone().unwrap_or_default())
            .status(RecordStatus::Active);
        for (key, value) in self.filters() {
            query = query.filter_opt(key, value);
        }
        query
    }

    /// Listing URL for `page`, keeping search and filters.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let mut url = format!("/products?page={page}");
        if let Some(limit) = self.limit {
            url.push_str(&format!("&limit={limit}"));
        }
        let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        for (key, value) in std::iter::once(("search", search)).chain(self.filters()) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                url.push_str(&format!("&{key}={}", urlencoding::encode(value)));
            }
        }
        url
    }
}

/// Display product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListingParams>,
) -> impl IntoResponse {
    let currency = state.config().currency;
    let listing = state.catalog().products(&params.to_query()).await;

    if listing.stale {
        tracing::warn!("Serving stale product listing");
    }

    ProductsIndexTemplate {
        chrome: PageChrome::load(&session).await,
        products: listing
            .page
            .items
            .iter()
            .map(|product| ProductCardView::new(product, currency))
            .collect(),
        pagination: PaginationView::new(&listing.page.pagination, |page| params.page_url(page)),
        search: params.search.clone().unwrap_or_default(),
        stale: listing.stale,
    }
}

// =============================================================================
// Detail
// =============================================================================

/// URL of a product page showing `sku_id`.
#[must_use]
pub fn sku_url(product_id: &ProductId, sku_id: &SkuId) -> String {
    format!(
        "/products/{}/{}",
        urlencoding::encode(product_id.as_str()),
        urlencoding::encode(sku_id.as_str())
    )
}

/// SKU shown when a product page opens without one.
fn default_sku<'a>(product: &Product, skus: &'a [ProductSku]) -> Option<&'a ProductSku> {
    product
        .default_sku_id
        .as_ref()
        .and_then(|id| skus.iter().find(|sku| &sku.id == id))
        .or_else(|| skus.first())
}

async fn load_product(state: &AppState, product_id: &ProductId) -> Result<(Product, Vec<ProductSku>)> {
    let (product, skus) = tokio::join!(
        state.catalog().product(product_id),
        state.catalog().product_skus(product_id)
    );
    let product = product.map_err(|e| AppError::from_lookup(e, "Product"))?;
    let skus = skus?;
    Ok((product, skus.as_ref().clone()))
}

async fn render_detail(
    state: &AppState,
    session: &Session,
    product: &Product,
    skus: &[ProductSku],
    sku: Option<&ProductSku>,
) -> Result<ProductShowTemplate> {
    let currency = state.config().currency;
    let selection = sku.map(Selection::from_sku).unwrap_or_default();
    let resolver = VariationResolver::new(skus).with_selection(selection);
    let panel = VariantPanelTemplate::new(product, &resolver, sku, currency);

    let mut images = sku.map(|sku| sku.images.clone()).unwrap_or_default();
    if images.is_empty() {
        images.clone_from(&product.images);
    }

    Ok(ProductShowTemplate {
        chrome: PageChrome::load(session).await,
        name: product.name.clone(),
        description: product.description.clone(),
        images,
        panel_html: panel.render_html()?,
    })
}

/// Display product detail page with its default SKU.
#[instrument(skip(state, session), fields(product_id = %product_id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
) -> Result<ProductShowTemplate> {
    let product_id = ProductId::new(product_id);
    let (product, skus) = load_product(&state, &product_id).await?;
    let sku = default_sku(&product, &skus);
    render_detail(&state, &session, &product, &skus, sku).await
}

/// Display product detail page for a specific SKU.
#[instrument(skip(state, session), fields(product_id = %product_id, sku_id = %sku_id))]
pub async fn show_sku(
    State(state): State<AppState>,
    session: Session,
    Path((product_id, sku_id)): Path<(String, String)>,
) -> Result<ProductShowTemplate> {
    let product_id = ProductId::new(product_id);
    let sku_id = SkuId::new(sku_id);
    let (product, skus) = load_product(&state, &product_id).await?;

    let sku = state
        .catalog()
        .sku(&sku_id)
        .await
        .map_err(|e| AppError::from_lookup(e, "Product variant"))?;
    if sku.product_id != product_id {
        return Err(AppError::NotFound("Product variant".to_string()));
    }

    render_detail(&state, &session, &product, &skus, Some(&sku)).await
}

/// Option click form data.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    /// SKU currently on display.
    #[serde(default)]
    pub sku_id: Option<String>,
    /// JSON-encoded selection before this click.
    #[serde(default)]
    pub selection: String,
    pub variation_id: String,
    pub option_id: String,
}

/// Selection carried by the panel's hidden input; blank means nothing picked.
fn parse_selection(raw: &str) -> Result<Selection> {
    if raw.trim().is_empty() {
        return Ok(Selection::new());
    }
    serde_json::from_str(raw).map_err(|e| AppError::BadRequest(format!("Invalid selection: {e}")))
}

/// Toggle a variation option.
///
/// HTMX requests get the variant panel fragment, with `HX-Replace-Url` when
/// the selection resolves to a different SKU. Plain form posts are redirected
/// to the resolved SKU's page.
#[instrument(skip(state, headers, form), fields(product_id = %product_id))]
pub async fn select(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Form(form): Form<SelectForm>,
) -> Result<Response> {
    let currency = state.config().currency;
    let product_id = ProductId::new(product_id);
    let (product, skus) = load_product(&state, &product_id).await?;

    let selection = parse_selection(&form.selection)?;
    let mut resolver = VariationResolver::new(&skus).with_selection(selection);
    resolver.select_option(
        VariationId::new(form.variation_id),
        OptionId::new(form.option_id),
    );

    let displayed = form
        .sku_id
        .filter(|id| !id.is_empty())
        .map(SkuId::new)
        .or_else(|| default_sku(&product, &skus).map(|sku| sku.id.clone()));
    let switched_to = match &displayed {
        Some(displayed) => resolver.next_sku(displayed).cloned(),
        None => resolver.matching_sku().cloned(),
    };

    // A switch reloads the full SKU detail; otherwise keep what is shown.
    let shown = match &switched_to {
        Some(id) => Some(
            state
                .catalog()
                .sku(id)
                .await
                .map_err(|e| AppError::from_lookup(e, "Product variant"))?,
        ),
        None => displayed
            .as_ref()
            .and_then(|id| skus.iter().find(|sku| &sku.id == id))
            .cloned(),
    };

    if !is_htmx(&headers) {
        let target = shown.as_ref().map_or_else(
            || format!("/products/{}", urlencoding::encode(product_id.as_str())),
            |sku| sku_url(&product_id, &sku.id),
        );
        return Ok(Redirect::to(&target).into_response());
    }

    let html = VariantPanelTemplate::new(&product, &resolver, shown.as_ref(), currency)
        .render_html()?;

    Ok(match switched_to {
        Some(sku_id) => (
            AppendHeaders([("HX-Replace-Url", sku_url(&product_id, &sku_id))]),
            Html(html),
        )
            .into_response(),
        None => Html(html).into_response(),
    })
}
