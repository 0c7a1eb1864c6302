//! `bazaar-cli list`: print one page of a resource.

use std::fmt::Write as _;

use circuit_bazaar_core::RecordStatus;
use circuit_bazaar_gateway::{ApiClient, ListQuery, Page, ResourceKind};
use serde_json::Value;

use super::CommandError;

/// Options accepted by `list`.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<RecordStatus>,
}

impl ListOptions {
    fn to_query(&self) -> ListQuery {
        let query = ListQuery::new().page(self.page).limit(self.limit);
        let query = match &self.search {
            Some(search) => query.search(search),
            None => query,
        };
        match self.status {
            Some(status) => query.status(status),
            None => query,
        }
    }
}

/// Fetch a page of `resource` and format it as a table.
///
/// # Errors
///
/// Returns an error if `resource` is unknown or the backend call fails.
pub async fn run(
    client: &ApiClient,
    resource: &str,
    options: &ListOptions,
) -> Result<String, CommandError> {
    let kind: ResourceKind = resource.parse()?;
    let page: Page<Value> = client.list(kind, &options.to_query()).await?;
    Ok(render(kind, &page))
}

/// One line per record: id, display name, status.
pub(crate) fn render(kind: ResourceKind, page: &Page<Value>) -> String {
    let mut out = String::new();
    if page.is_empty() {
        let _ = writeln!(out, "No {} found.", kind.name());
        return out;
    }

    for record in &page.items {
        let _ = writeln!(
            out,
            "{:<24} {:<40} {}",
            text_field(record, "id").unwrap_or("-"),
            display_name(record),
            text_field(record, "status").unwrap_or("-"),
        );
    }

    let pagination = &page.pagination;
    let _ = writeln!(
        out,
        "page {}/{} ({} total)",
        pagination.page, pagination.total_pages, pagination.total
    );
    out
}

fn text_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn display_name(record: &Value) -> &str {
    ["name", "title", "code"]
        .iter()
        .find_map(|key| text_field(record, key).filter(|value| !value.is_empty()))
        .unwrap_or("-")
}
