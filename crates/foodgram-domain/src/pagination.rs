//! Page-number pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination parameters shared across paginated list endpoints.
///
/// - `page`: ≥ 1, default 1
/// - `limit`: 1–100, default 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    6
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Clamp `limit` to the valid range 1–100 and `page` to ≥ 1.
    ///
    /// Call after deserializing from query params to enforce bounds.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus links to its neighbours.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page. `base_url` is the absolute URL of the list endpoint
    /// without a query string; `raw_query` is the query the client sent.
    pub fn new(
        results: Vec<T>,
        count: u64,
        request: PageRequest,
        base_url: &str,
        raw_query: Option<&str>,
    ) -> Self {
        let request = request.clamped();
        let shown = u64::from(request.page) * u64::from(request.limit);
        let next = (shown < count).then(|| page_link(base_url, raw_query, request.page + 1));
        let previous =
            (request.page > 1).then(|| page_link(base_url, raw_query, request.page - 1));
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Rewrite the `page` parameter of a query string, keeping every other pair
/// untouched. Page 1 is expressed by omitting the parameter.
pub fn page_link(base_url: &str, raw_query: Option<&str>, page: u32) -> String {
    let mut pairs: Vec<String> = raw_query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .map(str::to_owned)
        .collect();
    if page > 1 {
        pairs.push(format!("page={page}"));
    }
    if pairs.is_empty() {
        base_url.to_owned()
    } else {
        format!("{base_url}?{}", pairs.join("&"))
    }
}
