//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use circuit_bazaar_core::BlogId;
use circuit_bazaar_core::catalog::BlogPost;
use circuit_bazaar_gateway::ListQuery;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::{PageChrome, PaginationView, empty_string_as_none};
use crate::state::AppState;

/// Posts per index page.
const PAGE_SIZE: u32 = 9;

/// Post view for templates.
#[derive(Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub cover_image: Option<String>,
    /// Trusted HTML from the admin editor.
    pub content_html: String,
}

impl From<&BlogPost> for PostView {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            summary: post.summary.clone(),
            author: post.author.clone(),
            published_at: post
                .published_at
                .map(|at| at.format("%B %-d, %Y").to_string()),
            cover_image: post.cover_image.clone(),
            content_html: post.content.clone(),
        }
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub chrome: PageChrome,
    pub posts: Vec<PostView>,
    pub pagination: PaginationView,
    pub stale: bool,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub chrome: PageChrome,
    pub post: PostView,
    /// Canonical URL of the post.
    pub canonical_url: String,
}

/// Blog index query parameters.
#[derive(Debug, Deserialize)]
pub struct BlogParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
}

/// Display the blog index page with active posts.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BlogParams>,
) -> impl IntoResponse {
    let query = ListQuery::new()
        .page(params.page.unwrap_or(1))
        .limit(PAGE_SIZE);
    let listing = state.catalog().blogs(&query).await;

    BlogIndexTemplate {
        chrome: PageChrome::load(&session).await,
        posts: listing.page.items.iter().map(PostView::from).collect(),
        pagination: PaginationView::new(&listing.page.pagination, |page| {
            format!("/blogs?page={page}")
        }),
        stale: listing.stale,
    }
}

/// Display a single blog post.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is inactive.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<BlogShowTemplate> {
    let post = state
        .catalog()
        .blog(&BlogId::new(id))
        .await
        .map_err(|e| AppError::from_lookup(e, "Blog post"))?;

    if !post.is_published() {
        return Err(AppError::NotFound("Blog post".to_string()));
    }

    let canonical_url = format!(
        "{}/blogs/{}",
        state.config().base_url.trim_end_matches('/'),
        urlencoding::encode(post.id.as_str())
    );

    Ok(BlogShowTemplate {
        chrome: PageChrome::load(&session).await,
        post: PostView::from(&post),
        canonical_url,
    })
}
