//! Wire types for the remote document API.
//!
//! The document store wraps list responses in a pagination envelope with
//! camelCase keys. Single-document responses deserialize straight into the
//! domain models, which share the store's field names.

use serde::Deserialize;

use crate::domain::models::{Rule, RulePage};

/// Pagination envelope returned by `GET /{collection}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocListResponse {
    /// Documents on this page.
    pub docs: Vec<Rule>,
    /// Total documents across all pages.
    pub total_docs: u64,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Whether another page follows.
    #[serde(default)]
    pub has_next_page: bool,
}

fn default_page() -> u64 {
    1
}

impl From<DocListResponse> for RulePage {
    fn from(resp: DocListResponse) -> Self {
        Self {
            items: resp.docs,
            total: resp.total_docs,
            page: resp.page,
            has_next: resp.has_next_page,
        }
    }
}
