//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use circuit_bazaar_core::catalog::{Banner, CarouselSlide};
use tower_sessions::Session;
use tracing::instrument;

use crate::routes::PageChrome;
use crate::routes::blog::PostView;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Blog teasers on the home page.
const HOME_POST_COUNT: u32 = 3;

/// A single slide in the hero carousel.
#[derive(Clone)]
pub struct SlideView {
    pub title: String,
    pub subtitle: Option<String>,
    pub image: String,
    pub link: Option<String>,
}

impl From<&CarouselSlide> for SlideView {
    fn from(slide: &CarouselSlide) -> Self {
        Self {
            title: slide.title.clone(),
            subtitle: slide.subtitle.clone(),
            image: slide.image.clone(),
            link: slide.link.clone(),
        }
    }
}

/// Promotional banner tile.
#[derive(Clone)]
pub struct BannerView {
    pub title: String,
    pub image: String,
    pub link: Option<String>,
}

impl From<&Banner> for BannerView {
    fn from(banner: &Banner) -> Self {
        Self {
            title: banner.title.clone(),
            image: banner.image.clone(),
            link: banner.link.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
    pub slides: Vec<SlideView>,
    pub banners: Vec<BannerView>,
    pub products: Vec<ProductCardView>,
    pub posts: Vec<PostView>,
}

/// Display the home page.
///
/// Sections load concurrently; each one that fails falls back to its last
/// known content (or nothing) without failing the page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let catalog = state.catalog();
    let currency = state.config().currency;
    let post_query = circuit_bazaar_gateway::ListQuery::new().limit(HOME_POST_COUNT);

    let (slides, banners, products, posts) = tokio::join!(
        catalog.carousels(),
        catalog.banners(),
        catalog.latest_products(),
        catalog.blogs(&post_query),
    );

    HomeTemplate {
        chrome: PageChrome::load(&session).await,
        slides: slides.page.items.iter().map(SlideView::from).collect(),
        banners: banners.page.items.iter().map(BannerView::from).collect(),
        products: products
            .page
            .items
            .iter()
            .map(|product| ProductCardView::new(product, currency))
            .collect(),
        posts: posts.page.items.iter().map(PostView::from).collect(),
    }
}
