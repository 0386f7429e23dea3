//! Deterministic query-string accumulation.
//!
//! Parameters keep their insertion order, so two builders that receive the
//! same calls in the same order always encode to byte-identical strings.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::form_urlencoded;

/// Characters escaped when a value is embedded as a single path segment.
///
/// Covers the query/fragment reserved set plus `/`, so a project path like
/// `group/name` or a branch named `release/1.0` stays one segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'&')
    .add(b'+')
    .add(b'=');

/// Percent-encode a value for use as one URL path segment.
pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Ordered query parameters with last-write-wins keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. A repeated key overwrites the earlier value in place,
    /// keeping the key's original position.
    pub(crate) fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as an `application/x-www-form-urlencoded` query string,
    /// without the leading `?`.
    pub(crate) fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_preserves_insertion_order() {
        let mut params = QueryParams::new();
        params.set("state", "opened");
        params.set("labels", "bug");
        params.set("page", 2);
        assert_eq!(params.encode(), "state=opened&labels=bug&page=2");
    }

    #[test]
    fn repeated_key_overwrites_in_place() {
        let mut params = QueryParams::new();
        params.set("search", "first");
        params.set("sort", "asc");
        params.set("search", "second");
        assert_eq!(params.encode(), "search=second&sort=asc");
    }

    #[test]
    fn identical_call_sequences_encode_identically() {
        let build = || {
            let mut p = QueryParams::new();
            p.set("ref_name", "main");
            p.set("per_page", 50);
            p.set("author", "jane doe");
            p
        };
        assert_eq!(build().encode(), build().encode());
    }

    #[test]
    fn values_are_percent_encoded() {
        let mut params = QueryParams::new();
        params.set("search", "hello world & more");
        assert_eq!(params.encode(), "search=hello+world+%26+more");
    }

    #[test]
    fn empty_params_encode_to_empty_string() {
        let params = QueryParams::new();
        assert!(params.is_empty());
        assert_eq!(params.encode(), "");
    }

    #[test]
    fn segment_encoding_escapes_slashes_and_spaces() {
        assert_eq!(encode_segment("group/project"), "group%2Fproject");
        assert_eq!(encode_segment("release/1.0"), "release%2F1.0");
        assert_eq!(encode_segment("plain-name"), "plain-name");
        assert_eq!(encode_segment("a b"), "a%20b");
    }
}
