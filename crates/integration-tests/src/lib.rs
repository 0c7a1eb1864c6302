//! End-to-end test harness for Circuit Bazaar.
//!
//! Tests run both web apps in-process against [`StubBackend`], an axum app
//! that speaks the commerce backend's envelope conventions and keeps its
//! records in memory. Every server binds `127.0.0.1:0`, so tests run in
//! parallel without fixed ports.
//!
//! ```rust,ignore
//! let backend = StubBackend::spawn().await;
//! let storefront = spawn_storefront(&backend).await;
//! let resp = storefront.client.get(storefront.url("/products")).send().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use circuit_bazaar_gateway::TracingNotifier;
use serde_json::{Value, json};
use url::Url;

/// Token the stub hands out for [`ADMIN_PASSWORD`].
pub const ADMIN_TOKEN: &str = "stub-admin-token";

/// The only password the stub accepts.
pub const ADMIN_PASSWORD: &str = "correct horse";

/// WhatsApp number the storefront is configured with.
pub const WHATSAPP_NUMBER: &str = "15550100999";

// =============================================================================
// Servers
// =============================================================================

/// A running app plus a cookie-keeping client that does not follow redirects.
pub struct TestServer {
    pub base: Url,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Absolute URL for `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not join onto the base URL.
    #[must_use]
    #[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }
}

/// Serve `router` on an ephemeral port and return its base URL.
///
/// # Panics
///
/// Panics if the listener cannot bind.
#[allow(clippy::unwrap_used)]
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[allow(clippy::unwrap_used)]
fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn lookup(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
    move |key| vars.get(key).cloned()
}

/// Start the storefront against `backend`.
///
/// # Panics
///
/// Panics if the storefront cannot be configured.
#[allow(clippy::unwrap_used)]
pub async fn spawn_storefront(backend: &StubBackend) -> TestServer {
    use circuit_bazaar_storefront::{config::StorefrontConfig, state::AppState};

    let config = StorefrontConfig::from_lookup(lookup(HashMap::from([
        ("STOREFRONT_BASE_URL", "http://127.0.0.1".to_string()),
        ("BACKEND_URL", backend.base.to_string()),
        ("WHATSAPP_NUMBER", WHATSAPP_NUMBER.to_string()),
        ("BACKEND_TIMEOUT_SECS", "5".to_string()),
    ])))
    .unwrap();
    let state = AppState::new(config, Arc::new(TracingNotifier)).unwrap();

    TestServer {
        base: serve(circuit_bazaar_storefront::app(state)).await,
        client: test_client(),
    }
}

/// Start the admin API against `backend`.
///
/// # Panics
///
/// Panics if the admin app cannot be configured.
#[allow(clippy::unwrap_used)]
pub async fn spawn_admin(backend: &StubBackend) -> TestServer {
    use circuit_bazaar_admin::{config::AdminConfig, state::AppState};

    let config = AdminConfig::from_lookup(lookup(HashMap::from([
        ("ADMIN_BASE_URL", "http://127.0.0.1".to_string()),
        ("BACKEND_URL", backend.base.to_string()),
        ("BACKEND_TIMEOUT_SECS", "5".to_string()),
    ])))
    .unwrap();
    let state = AppState::new(config, Arc::new(TracingNotifier)).unwrap();

    TestServer {
        base: serve(circuit_bazaar_admin::app(state)).await,
        client: test_client(),
    }
}

/// Log the admin client in with the stub's credentials.
///
/// # Panics
///
/// Panics if the login request fails to send.
#[allow(clippy::unwrap_used)]
pub async fn login(admin: &TestServer) -> reqwest::Response {
    admin
        .client
        .post(admin.url("/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Stub backend
// =============================================================================

/// In-memory stand-in for the commerce backend.
#[derive(Clone)]
pub struct StubBackend {
    pub base: Url,
    state: Arc<StubState>,
}

#[derive(Default)]
struct StubState {
    records: Mutex<BTreeMap<String, Vec<Value>>>,
    next_id: AtomicU64,
    listings_down: AtomicBool,
    token_revoked: AtomicBool,
}

impl StubState {
    #[allow(clippy::unwrap_used)]
    fn records(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Value>>> {
        self.records.lock().unwrap()
    }
}

impl StubBackend {
    /// Start an empty backend.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());
        let router = Router::new()
            .route("/auth/login", post(stub_login))
            .route("/{resource}", get(stub_list).post(stub_create))
            .route(
                "/{resource}/{id}",
                get(stub_show).put(stub_update).delete(stub_delete),
            )
            .route("/{resource}/{id}/status", patch(stub_status))
            .with_state(state.clone());

        Self {
            base: serve(router).await,
            state,
        }
    }

    /// Start a backend seeded with [`seed_phone`].
    pub async fn with_catalog() -> Self {
        let backend = Self::spawn().await;
        seed_phone(&backend);
        backend
    }

    /// Store a record; it must carry an `id`.
    pub fn insert(&self, resource: &str, record: Value) {
        self.state
            .records()
            .entry(resource.to_string())
            .or_default()
            .push(record);
    }

    /// Current records of `resource`.
    #[must_use]
    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.state
            .records()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every list call fail with 503.
    pub fn set_listings_down(&self, down: bool) {
        self.state.listings_down.store(down, Ordering::SeqCst);
    }

    /// Reject the admin token from now on.
    pub fn revoke_token(&self) {
        self.state.token_revoked.store(true, Ordering::SeqCst);
    }
}

/// A phone with two variation axes and three SKUs:
///
/// | SKU         | Color | Storage | Stock | Limit |
/// |-------------|-------|---------|-------|-------|
/// | `red-64`    | red   | 64      | yes   | 2     |
/// | `red-128`   | red   | 128     | yes   | -     |
/// | `blue-64`   | blue  | 64      | no    | -     |
pub fn seed_phone(backend: &StubBackend) {
    backend.insert(
        "products",
        json!({
            "id": "phone",
            "name": "Phone X",
            "description": "A phone.",
            "category_id": "phones",
            "status": "active",
            "starting_price": "499.00",
            "default_sku_id": "red-64",
            "variations": [
                {"id": "color", "name": "Color", "options": [
                    {"id": "red", "name": "Red"}, {"id": "blue", "name": "Blue"}
                ]},
                {"id": "storage", "name": "Storage", "options": [
                    {"id": "64", "name": "64GB"}, {"id": "128", "name": "128GB"}
                ]}
            ]
        }),
    );
    for (id, color, storage, price, in_stock, limit) in [
        ("red-64", "red", "64", "499.00", true, Some(2)),
        ("red-128", "red", "128", "599.00", true, None),
        ("blue-64", "blue", "64", "499.00", false, None),
    ] {
        backend.insert(
            "product-skus",
            json!({
                "id": id,
                "product_id": "phone",
                "title": format!("Phone X - {color} / {storage}GB"),
                "price": price,
                "in_stock": in_stock,
                "order_limit": limit,
                "status": "active",
                "options": [
                    {"variation_id": "color", "option_id": color},
                    {"variation_id": "storage", "option_id": storage}
                ]
            }),
        );
    }
}

fn backend_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Writes need a live bearer token; reads only check it when one is sent.
fn check_token(state: &StubState, headers: &HeaderMap, required: bool) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        None if !required => Ok(()),
        Some(ADMIN_TOKEN) if !state.token_revoked.load(Ordering::SeqCst) => Ok(()),
        _ => Err(backend_error(StatusCode::UNAUTHORIZED, "Unauthenticated.")),
    }
}

async fn stub_login(Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) != Some(ADMIN_PASSWORD) {
        return backend_error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    Json(json!({
        "data": {
            "token": ADMIN_TOKEN,
            "user": {"name": "Ada", "email": body.get("email")}
        }
    }))
    .into_response()
}

fn matches_filters(record: &Value, params: &HashMap<String, String>) -> bool {
    params.iter().all(|(key, expected)| match key.as_str() {
        "page" | "limit" => true,
        "search" => record
            .get("name")
            .or_else(|| record.get("title"))
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(&expected.to_lowercase())),
        _ => record
            .get(key)
            .and_then(Value::as_str)
            .is_none_or(|value| value == expected),
    })
}

async fn stub_list(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, false) {
        return rejection;
    }
    if state.listings_down.load(Ordering::SeqCst) {
        return backend_error(StatusCode::SERVICE_UNAVAILABLE, "Maintenance");
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let matching: Vec<Value> = state
        .records()
        .get(&resource)
        .map(|records| {
            records
                .iter()
                .filter(|record| matches_filters(record, &params))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let total = matching.len();
    let data: Vec<Value> = matching
        .into_iter()
        .skip((page.max(1) - 1) * limit)
        .take(limit)
        .collect();

    Json(json!({
        "data": data,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "total_pages": total.div_ceil(limit.max(1)),
        }
    }))
    .into_response()
}

fn find_record(state: &StubState, resource: &str, id: &str) -> Option<Value> {
    state
        .records()
        .get(resource)?
        .iter()
        .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
        .cloned()
}

async fn stub_show(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, false) {
        return rejection;
    }
    find_record(&state, &resource, &id).map_or_else(
        || backend_error(StatusCode::NOT_FOUND, "Record not found"),
        |record| Json(json!({ "data": record })).into_response(),
    )
}

async fn stub_create(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(resource): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, true) {
        return rejection;
    }
    let id = format!("{resource}-{}", state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    body["id"] = json!(id);
    if body.get("status").is_none() {
        body["status"] = json!("active");
    }
    state
        .records()
        .entry(resource)
        .or_default()
        .push(body.clone());

    (StatusCode::CREATED, Json(json!({ "data": body }))).into_response()
}

/// Apply `change` to one record and answer with the result.
fn modify(
    state: &StubState,
    resource: &str,
    id: &str,
    change: impl FnOnce(&mut Value),
) -> Response {
    let mut records = state.records();
    let Some(record) = records
        .get_mut(resource)
        .and_then(|list| list.iter_mut().find(|r| r.get("id").and_then(Value::as_str) == Some(id)))
    else {
        return backend_error(StatusCode::NOT_FOUND, "Record not found");
    };
    change(record);
    Json(json!({ "data": record.clone() })).into_response()
}

async fn stub_update(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, true) {
        return rejection;
    }
    modify(&state, &resource, &id, |record| {
        if let (Some(record), Some(fields)) = (record.as_object_mut(), body.as_object()) {
            for (key, value) in fields {
                record.insert(key.clone(), value.clone());
            }
        }
    })
}

async fn stub_status(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, true) {
        return rejection;
    }
    let status = body.get("status").cloned().unwrap_or(Value::Null);
    modify(&state, &resource, &id, |record| record["status"] = status)
}

async fn stub_delete(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    if let Err(rejection) = check_token(&state, &headers, true) {
        return rejection;
    }
    let mut records = state.records();
    let Some(list) = records.get_mut(&resource) else {
        return backend_error(StatusCode::NOT_FOUND, "Record not found");
    };
    let before = list.len();
    list.retain(|record| record.get("id").and_then(Value::as_str) != Some(id.as_str()));
    if list.len() == before {
        return backend_error(StatusCode::NOT_FOUND, "Record not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
