//! Catalog reads for the storefront.
//!
//! Single records (products, SKU lists, SKUs, blog posts) are cached with
//! `moka` for the configured TTL. Listings are never cached by TTL: each read
//! goes to the backend, and the last successful page per query is kept as a
//! fallback. A failed refresh serves that page flagged as stale instead of
//! blanking the view.

use std::sync::Arc;
use std::time::Duration;

use circuit_bazaar_core::catalog::{Banner, BlogPost, CarouselSlide, Product, ProductSku};
use circuit_bazaar_core::{BlogId, ProductId, RecordStatus, SkuId};
use circuit_bazaar_gateway::{
    ApiClient, GatewayError, ListQuery, Page, RequestSequencer, SnapshotStore,
};
use moka::future::Cache;
use tracing::{debug, instrument};

/// Number of products on the home page.
pub const HOME_PRODUCT_COUNT: u32 = 8;

/// Banners and slides fetched for the home page.
const HOME_CONTENT_LIMIT: u32 = 10;

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Skus(Arc<Vec<ProductSku>>),
    Sku(Box<ProductSku>),
    Blog(Box<BlogPost>),
}

/// A page of results and whether it is a fallback copy.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub page: Page<T>,
    /// The latest refresh failed; `page` is the last good copy (or empty).
    pub stale: bool,
}

/// Cached access to the backend catalog.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    client: ApiClient,
    cache: Cache<String, CacheValue>,
    sequencer: RequestSequencer,
    products: SnapshotStore<Page<Product>>,
    banners: SnapshotStore<Page<Banner>>,
    carousels: SnapshotStore<Page<CarouselSlide>>,
    blogs: SnapshotStore<Page<BlogPost>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("client", &self.inner.client)
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    #[must_use]
    pub fn new(client: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                client,
                cache,
                sequencer: RequestSequencer::new(),
                products: SnapshotStore::new(),
                banners: SnapshotStore::new(),
                carousels: SnapshotStore::new(),
                blogs: SnapshotStore::new(),
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    // =========================================================================
    // Single records
    // =========================================================================

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the backend fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.client.product(id).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// All SKUs of a product, in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_skus(&self, id: &ProductId) -> Result<Arc<Vec<ProductSku>>, GatewayError> {
        let cache_key = format!("skus:{id}");

        if let Some(CacheValue::Skus(skus)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product SKUs");
            return Ok(skus);
        }

        let skus = Arc::new(self.inner.client.product_skus(id).await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Skus(Arc::clone(&skus)))
            .await;
        Ok(skus)
    }

    /// Full detail of one SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the SKU is not found or the backend fails.
    #[instrument(skip(self), fields(sku_id = %id))]
    pub async fn sku(&self, id: &SkuId) -> Result<ProductSku, GatewayError> {
        let cache_key = format!("sku:{id}");

        if let Some(CacheValue::Sku(sku)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for SKU");
            return Ok(*sku);
        }

        let sku = self.inner.client.sku(id).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Sku(Box::new(sku.clone())))
            .await;
        Ok(sku)
    }

    /// Get a blog post by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is not found or the backend fails.
    #[instrument(skip(self), fields(blog_id = %id))]
    pub async fn blog(&self, id: &BlogId) -> Result<BlogPost, GatewayError> {
        let cache_key = format!("blog:{id}");

        if let Some(CacheValue::Blog(post)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for blog post");
            return Ok(*post);
        }

        let post = self.inner.client.blog(id).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Blog(Box::new(post.clone())))
            .await;
        Ok(post)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// One page of products.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ListQuery) -> Listing<Product> {
        refresh(
            &self.inner.sequencer,
            &self.inner.products,
            query,
            self.inner.client.list_products(query),
        )
        .await
    }

    /// Newest active products for the home page.
    pub async fn latest_products(&self) -> Listing<Product> {
        let query = ListQuery::new()
            .limit(HOME_PRODUCT_COUNT)
            .status(RecordStatus::Active);
        self.products(&query).await
    }

    /// Active banners.
    #[instrument(skip(self))]
    pub async fn banners(&self) -> Listing<Banner> {
        let query = ListQuery::new()
            .limit(HOME_CONTENT_LIMIT)
            .status(RecordStatus::Active);
        refresh(
            &self.inner.sequencer,
            &self.inner.banners,
            &query,
            self.inner.client.banners(&query),
        )
        .await
    }

    /// Active carousel slides in display order.
    #[instrument(skip(self))]
    pub async fn carousels(&self) -> Listing<CarouselSlide> {
        let query = ListQuery::new()
            .limit(HOME_CONTENT_LIMIT)
            .status(RecordStatus::Active);
        let mut listing = refresh(
            &self.inner.sequencer,
            &self.inner.carousels,
            &query,
            self.inner.client.carousels(&query),
        )
        .await;
        listing.page.items.sort_by_key(|slide| slide.sort_order);
        listing
    }

    /// One page of active blog posts.
    #[instrument(skip(self))]
    pub async fn blogs(&self, query: &ListQuery) -> Listing<BlogPost> {
        let query = query.clone().status(RecordStatus::Active);
        refresh(
            &self.inner.sequencer,
            &self.inner.blogs,
            &query,
            self.inner.client.blogs(&query),
        )
        .await
    }
}

/// Run a listing fetch and reconcile it with the snapshot for its query.
async fn refresh<T: Clone + Send + Sync + 'static>(
    sequencer: &RequestSequencer,
    snapshots: &SnapshotStore<Page<T>>,
    query: &ListQuery,
    fetch: impl Future<Output = Result<Page<T>, GatewayError>>,
) -> Listing<T> {
    let key = query.cache_key();
    let ticket = sequencer.issue();

    match fetch.await {
        Ok(page) => {
            if snapshots.accept(&key, ticket, page.clone()) {
                Listing { page, stale: false }
            } else {
                debug!(key = %key, "Discarding superseded listing response");
                Listing {
                    page: snapshots.get(&key).unwrap_or(page),
                    stale: false,
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, key = %key, "Listing refresh failed, serving last known page");
            let page = snapshots
                .get(&key)
                .unwrap_or_else(|| Page::empty(query.page_number(), query.page_size()));
            Listing { page, stale: true }
        }
    }
}
