//! Pagination descriptors and next-page signal parsing.

use crate::error::{Error, Result};
use crate::http::{HttpHeaders, header_get};

/// Page size the service applies when none is requested.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size the service accepts; fetch-all traversal uses it.
pub const MAX_PER_PAGE: u32 = 100;

/// How a collection endpoint should be traversed.
///
/// A value is immutable once constructed. "Fetch everything" is an explicit
/// variant rather than a sentinel page number, so it can never collide with a
/// real page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Fetch exactly one page.
    Page { page: u32, per_page: u32 },
    /// Walk every page and concatenate the results.
    All,
}

impl Pagination {
    /// A specific page. Fails with `InvalidArgument` unless both `page` and
    /// `per_page` are at least 1.
    pub fn of(page: u32, per_page: u32) -> Result<Self> {
        if page < 1 {
            return Err(Error::invalid_argument("page must be >= 1"));
        }
        if per_page < 1 {
            return Err(Error::invalid_argument("per_page must be >= 1"));
        }
        Ok(Self::Page { page, per_page })
    }

    /// Traverse the entire collection.
    pub fn all() -> Self {
        Self::All
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::Page {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Next-page hint extracted from a collection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NextPage {
    /// The server named the next page.
    Next(u32),
    /// The server said this is the last page.
    End,
    /// No signal; the walker falls back to the count heuristic.
    Unknown,
}

/// Read the next-page signal from response headers.
///
/// GitLab-style services send an `x-next-page` header (empty on the last
/// page); others send an RFC 5988 `Link` header with a `rel="next"` entry.
/// The header form wins when both are present.
pub(crate) fn next_page_hint(headers: &HttpHeaders) -> NextPage {
    if let Some(raw) = header_get(headers, "x-next-page") {
        let raw = raw.trim();
        if raw.is_empty() {
            return NextPage::End;
        }
        if let Ok(page) = raw.parse::<u32>() {
            return NextPage::Next(page);
        }
        return NextPage::Unknown;
    }

    if let Some(link) = header_get(headers, "link") {
        return match link_next_page(link) {
            Some(page) => NextPage::Next(page),
            None => NextPage::End,
        };
    }

    NextPage::Unknown
}

/// Extract the `rel="next"` page number from a `Link` header.
///
/// Link headers look like:
/// `<https://host/api/v4/projects?page=2&per_page=100>; rel="next", <...page=5...>; rel="last"`
fn link_next_page(link_header: &str) -> Option<u32> {
    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        if rel == Some("next") {
            return url.and_then(page_from_url);
        }
    }
    None
}

/// Pull the `page` query parameter out of a pagination URL.
fn page_from_url(url: &str) -> Option<u32> {
    let query = &url[url.find('?')? + 1..];
    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }
    None
}
