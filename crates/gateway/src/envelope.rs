//! Response envelopes used by the backend.

use serde::{Deserialize, Serialize};

/// `{"data": T, "message"?: string}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Pagination for a response that did not carry one.
    #[must_use]
    pub fn single(page: u32, limit: u32, count: usize) -> Self {
        Self {
            page,
            limit,
            total: u64::try_from(count).unwrap_or(u64::MAX),
            total_pages: u32::from(count > 0),
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// `{"data": [T], "pagination": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// An empty page, used when nothing has ever been fetched.
    #[must_use]
    pub const fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination {
                page,
                limit,
                total: 0,
                total_pages: 0,
            },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    pub(crate) fn from_envelope(envelope: ListEnvelope<T>, page: u32, limit: u32) -> Self {
        let pagination = envelope
            .pagination
            .unwrap_or_else(|| Pagination::single(page, limit, envelope.data.len()));
        Self {
            items: envelope.data,
            pagination,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope_with_pagination() {
        let json = r#"{
            "data": [1, 2, 3],
            "message": "ok",
            "pagination": {"page": 2, "limit": 3, "total": 9, "total_pages": 3}
        }"#;
        let envelope: ListEnvelope<u32> = serde_json::from_str(json).unwrap();
        let page = Page::from_envelope(envelope, 1, 20);

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.pagination.page, 2);
        assert!(page.pagination.has_next());
        assert!(page.pagination.has_previous());
    }

    #[test]
    fn test_missing_pagination_is_synthesized() {
        let envelope: ListEnvelope<u32> = serde_json::from_str(r#"{"data": [7]}"#).unwrap();
        let page = Page::from_envelope(envelope, 1, 20);

        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(!page.pagination.has_next());
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u32> = Page::empty(1, 12);
        assert!(page.is_empty());
        assert!(!page.pagination.has_next());
    }
}
