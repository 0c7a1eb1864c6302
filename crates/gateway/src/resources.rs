//! Backend resources and typed calls.

use std::str::FromStr;

use circuit_bazaar_core::catalog::{
    Banner, BlogPost, Brand, CarouselSlide, Category, InnerCategory, Product, ProductSku,
    SubCategory,
};
use circuit_bazaar_core::{BlogId, ProductId, RecordStatus, SkuId};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::envelope::ListEnvelope;
use crate::query::MAX_LIMIT;
use crate::{ApiClient, Envelope, GatewayError, ListQuery, Method, Page, RequestBody};

// =============================================================================
// ResourceKind
// =============================================================================

/// A CRUD collection exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Categories,
    SubCategories,
    InnerCategories,
    Brands,
    Products,
    ProductSkus,
    Banners,
    Blogs,
    Carousels,
}

/// A resource name that is not one of [`ResourceKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl ResourceKind {
    pub const ALL: [Self; 9] = [
        Self::Categories,
        Self::SubCategories,
        Self::InnerCategories,
        Self::Brands,
        Self::Products,
        Self::ProductSkus,
        Self::Banners,
        Self::Blogs,
        Self::Carousels,
    ];

    /// URL segment, e.g. `sub-categories`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::SubCategories => "sub-categories",
            Self::InnerCategories => "inner-categories",
            Self::Brands => "brands",
            Self::Products => "products",
            Self::ProductSkus => "product-skus",
            Self::Banners => "banners",
            Self::Blogs => "blogs",
            Self::Carousels => "carousels",
        }
    }

    /// Human label for one record.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Categories => "Category",
            Self::SubCategories => "Sub-category",
            Self::InnerCategories => "Inner category",
            Self::Brands => "Brand",
            Self::Products => "Product",
            Self::ProductSkus => "SKU",
            Self::Banners => "Banner",
            Self::Blogs => "Blog post",
            Self::Carousels => "Carousel slide",
        }
    }

    #[must_use]
    pub fn path(self) -> String {
        format!("/{}", self.name())
    }

    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("/{}/{}", self.name(), urlencoding::encode(id))
    }

    /// Records with attachments are written as multipart.
    #[must_use]
    pub const fn uses_multipart(self) -> bool {
        !matches!(self, Self::SubCategories | Self::InnerCategories)
    }

    /// Equality filters the list endpoint understands.
    #[must_use]
    pub const fn filter_keys(self) -> &'static [&'static str] {
        match self {
            Self::SubCategories => &["category_id"],
            Self::InnerCategories => &["category_id", "sub_category_id"],
            Self::Products => &[
                "category_id",
                "sub_category_id",
                "inner_category_id",
                "brand_id",
            ],
            Self::ProductSkus => &["product_id"],
            Self::Categories | Self::Brands | Self::Banners | Self::Blogs | Self::Carousels => &[],
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Admin credentials.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// Token issued by the backend on login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: SecretString,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RawLogin {
    token: String,
    #[serde(default)]
    user: Option<RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

// =============================================================================
// Generic CRUD
// =============================================================================

impl ApiClient {
    /// Fetch one page of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the page does not decode.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &ListQuery,
    ) -> Result<Page<T>, GatewayError> {
        let envelope: ListEnvelope<T> = self
            .request_with_query(&kind.path(), Method::GET, &query.to_pairs(), RequestBody::Empty)
            .await?;
        Ok(Page::from_envelope(
            envelope,
            query.page_number(),
            query.page_size(),
        ))
    }

    /// Fetch one record of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; a missing record is a
    /// `Status` error with `is_not_found()`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<T, GatewayError> {
        let envelope: Envelope<T> = self
            .request(&kind.item_path(id), Method::GET, RequestBody::Empty)
            .await?;
        Ok(envelope.data)
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the record.
    pub async fn create<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        body: RequestBody,
    ) -> Result<T, GatewayError> {
        let envelope: Envelope<T> = self.request(&kind.path(), Method::POST, body).await?;
        Ok(envelope.data)
    }

    /// Replace a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    pub async fn update<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
        body: RequestBody,
    ) -> Result<T, GatewayError> {
        let envelope: Envelope<T> = self.request(&kind.item_path(id), Method::PUT, body).await?;
        Ok(envelope.data)
    }

    /// Set a record active or inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    pub async fn set_status<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
        status: RecordStatus,
    ) -> Result<T, GatewayError> {
        let path = format!("{}/status", kind.item_path(id));
        let body = RequestBody::Json(json!({ "status": status.as_str() }));
        let envelope: Envelope<T> = self.request(&path, Method::PATCH, body).await?;
        Ok(envelope.data)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the deletion.
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value = self
            .request(&kind.item_path(id), Method::DELETE, RequestBody::Empty)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, GatewayError> {
        self.list(ResourceKind::Products, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        self.get(ResourceKind::Products, id.as_str()).await
    }

    /// All SKUs of a product in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn product_skus(&self, id: &ProductId) -> Result<Vec<ProductSku>, GatewayError> {
        let query = ListQuery::new()
            .limit(MAX_LIMIT)
            .filter("product_id", id.as_str());
        let page: Page<ProductSku> = self.list(ResourceKind::ProductSkus, &query).await?;
        Ok(page.items)
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn sku(&self, id: &SkuId) -> Result<ProductSku, GatewayError> {
        self.get(ResourceKind::ProductSkus, id.as_str()).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn categories(&self, query: &ListQuery) -> Result<Page<Category>, GatewayError> {
        self.list(ResourceKind::Categories, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn sub_categories(
        &self,
        query: &ListQuery,
    ) -> Result<Page<SubCategory>, GatewayError> {
        self.list(ResourceKind::SubCategories, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn inner_categories(
        &self,
        query: &ListQuery,
    ) -> Result<Page<InnerCategory>, GatewayError> {
        self.list(ResourceKind::InnerCategories, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn brands(&self, query: &ListQuery) -> Result<Page<Brand>, GatewayError> {
        self.list(ResourceKind::Brands, query).await
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn banners(&self, query: &ListQuery) -> Result<Page<Banner>, GatewayError> {
        self.list(ResourceKind::Banners, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn carousels(
        &self,
        query: &ListQuery,
    ) -> Result<Page<CarouselSlide>, GatewayError> {
        self.list(ResourceKind::Carousels, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn blogs(&self, query: &ListQuery) -> Result<Page<BlogPost>, GatewayError> {
        self.list(ResourceKind::Blogs, query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn blog(&self, id: &BlogId) -> Result<BlogPost, GatewayError> {
        self.get(ResourceKind::Blogs, id.as_str()).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange admin credentials for a backend token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for bad credentials, or any other gateway error.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        let body = RequestBody::Json(json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        }));
        let envelope: Envelope<RawLogin> = self.request("/auth/login", Method::POST, body).await?;
        let raw = envelope.data;
        let (name, email) = raw
            .user
            .map_or((None, None), |user| (user.name, user.email));

        Ok(LoginResponse {
            token: SecretString::from(raw.token),
            name,
            email,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::client::tests::{serve, test_client};

    fn sku_json(id: &str, product: &str) -> Value {
        json!({
            "id": id,
            "product_id": product,
            "title": id,
            "options": [],
            "price": "10.00",
            "in_stock": true
        })
    }

    #[test]
    fn test_resource_kind_roundtrips_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.name().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!(
            "orders".parse::<ResourceKind>(),
            Err(UnknownResource("orders".to_string()))
        );
    }

    #[test]
    fn test_multipart_resources() {
        assert!(ResourceKind::Products.uses_multipart());
        assert!(ResourceKind::ProductSkus.uses_multipart());
        assert!(!ResourceKind::SubCategories.uses_multipart());
        assert!(!ResourceKind::InnerCategories.uses_multipart());
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(ResourceKind::Blogs.item_path("a b/c"), "/blogs/a%20b%2Fc");
    }

    #[tokio::test]
    async fn test_product_skus_filters_by_product() {
        let seen = Arc::new(Mutex::new(HashMap::new()));
        let captured = Arc::clone(&seen);
        let router = Router::new().route(
            "/api/product-skus",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let captured = Arc::clone(&captured);
                async move {
                    let product = params.get("product_id").cloned().unwrap_or_default();
                    *captured.lock().unwrap() = params;
                    Json(json!({
                        "data": [sku_json("s1", &product), sku_json("s2", &product)],
                        "pagination": {"page": 1, "limit": 100, "total": 2, "total_pages": 1}
                    }))
                }
            }),
        );
        let (client, _) = test_client(serve(router).await);

        let skus = client.product_skus(&ProductId::new("p9")).await.unwrap();

        assert_eq!(skus.len(), 2);
        assert_eq!(skus[0].product_id, ProductId::new("p9"));
        let params = seen.lock().unwrap().clone();
        assert_eq!(params.get("product_id").map(String::as_str), Some("p9"));
        assert_eq!(params.get("limit").map(String::as_str), Some("100"));
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let router = Router::new().route(
            "/api/blogs/{id}",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "Blog not found"}))) }),
        );
        let (client, notifier) = test_client(serve(router).await);

        let err = client.blog(&BlogId::new("nope")).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Blog not found");
        assert_eq!(notifier.received().len(), 1);
    }

    #[tokio::test]
    async fn test_set_status_and_delete() {
        let router = Router::new()
            .route(
                "/api/brands/{id}/status",
                patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({"data": {"id": id, "status": body["status"]}}))
                }),
            )
            .route(
                "/api/brands/{id}",
                axum::routing::delete(|| async { Json(json!({"message": "Deleted"})) }),
            );
        let (client, _) = test_client(serve(router).await);

        let updated: Value = client
            .set_status(ResourceKind::Brands, "b1", RecordStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(updated["status"], "inactive");
        assert_eq!(updated["id"], "b1");

        client.delete(ResourceKind::Brands, "b1").await.unwrap();
    }

    #[tokio::test]
    async fn test_login() {
        let router = Router::new().route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "hunter22" {
                    (
                        StatusCode::OK,
                        Json(json!({"data": {"token": "t-1", "user": {"name": "Ada"}}})),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Invalid credentials"})),
                    )
                }
            }),
        );
        let (client, _) = test_client(serve(router).await);

        let ok = client
            .login(&LoginRequest {
                email: "ada@example.com".to_string(),
                password: SecretString::from("hunter22"),
            })
            .await
            .unwrap();
        assert_eq!(ok.token.expose_secret(), "t-1");
        assert_eq!(ok.name.as_deref(), Some("Ada"));

        let err = client
            .login(&LoginRequest {
                email: "ada@example.com".to_string(),
                password: SecretString::from("wrong"),
            })
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid credentials");
    }
}
