//! This modules defines how the JSON API splits collections into pages.

use serde::Deserialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
            max_page_size: 250,
        }
    }
}

/// The `page` and `limit` query parameters sent by a client.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-based page number.
    pub number: u64,
    /// The maximum number of items on the page.
    pub size: u64,
}

impl Page {
    /// Resolve the client's query against `config`.
    ///
    /// Page numbers below one become one, and page sizes are clamped to
    /// between one and [PaginationConfig::max_page_size].
    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Self {
        Self {
            number: query.page.unwrap_or(config.default_page).max(1),
            size: query
                .limit
                .unwrap_or(config.default_page_size)
                .clamp(1, config.max_page_size),
        }
    }

    /// The number of rows to skip to get to this page.
    ///
    /// Returns `None` when the page starts past the largest offset SQLite accepts,
    /// in which case the page is empty.
    pub fn offset(&self) -> Option<i64> {
        (self.number - 1)
            .checked_mul(self.size)
            .and_then(|offset| i64::try_from(offset).ok())
    }

    /// The page size as an SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// The number of pages needed for `total` items, which is at least one.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.size).max(1)
    }
}
