//! List query parameters.

use std::collections::BTreeMap;

use circuit_bazaar_core::RecordStatus;

/// Default page size for list calls.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on `limit` sent to the backend.
pub const MAX_LIMIT: u32 = 100;

/// Pagination, search and filter parameters of a list call.
///
/// Every list endpoint accepts `page`, `limit`, `search` and `status`;
/// endpoint-specific filters (`category_id`, `product_id`, ...) go through
/// [`filter`](Self::filter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    search: Option<String>,
    status: Option<RecordStatus>,
    filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            search: None,
            status: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based page; 0 is treated as 1.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Page size, clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    /// Free-text search; blank strings are ignored.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Add an equality filter. Blank values are ignored.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.filters.insert(key.into(), value.to_string());
        }
        self
    }

    /// Apply an optional filter.
    #[must_use]
    pub fn filter_opt(self, key: impl Into<String>, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.filter(key, value),
            None => self,
        }
    }

    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn filter_value(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Query-string pairs in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Stable key identifying this query, for caches and snapshots.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
