//! Live search suggestions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use circuit_bazaar_core::RecordStatus;
use circuit_bazaar_gateway::ListQuery;
use serde::Deserialize;
use tracing::instrument;

use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Suggestions shown under the search box.
const SUGGESTION_LIMIT: u32 = 6;

/// Shortest query that triggers a backend search.
const MIN_QUERY_CHARS: usize = 2;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

/// Search suggestions fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_suggest.html")]
pub struct SearchSuggestTemplate {
    pub query: String,
    pub products: Vec<ProductCardView>,
    pub search_url: String,
}

/// Return product suggestions for the search box (HTMX).
///
/// Typing fires this on every debounced keystroke. Listing snapshots are
/// sequenced per query string only; across keystrokes the search input's
/// `hx-sync="this:replace"` aborts the in-flight request for an older prefix.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> impl IntoResponse {
    let query = params.q.trim().to_string();
    let search_url = format!("/products?search={}", urlencoding::encode(&query));

    if query.chars().count() < MIN_QUERY_CHARS {
        return SearchSuggestTemplate {
            query,
            products: Vec::new(),
            search_url,
        };
    }

    let currency = state.config().currency;
    let listing = state
        .catalog()
        .products(
            &ListQuery::new()
                .limit(SUGGESTION_LIMIT)
                .search(query.clone())
                .status(RecordStatus::Active),
        )
        .await;

    SearchSuggestTemplate {
        products: listing
            .page
            .items
            .iter()
            .map(|product| ProductCardView::new(product, currency))
            .collect(),
        query,
        search_url,
    }
}

#[cfg(test)]
mod tests {
    const BASE_LAYOUT: &str = include_str!("../../templates/base.html");

    #[test]
    fn test_search_input_replaces_in_flight_suggestions() {
        let input = BASE_LAYOUT
            .split("<input type=\"search\"")
            .nth(1)
            .and_then(|rest| rest.split('>').next())
            .unwrap_or_default();

        assert!(input.contains("hx-get=\"/search/suggest\""));
        assert!(input.contains("hx-sync=\"this:replace\""));
    }
}
