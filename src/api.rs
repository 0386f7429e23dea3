//! The requestor: single point of contact with the remote service.
//!
//! Owns the transport, base URL and credentials; issues verbs, walks pages,
//! and normalizes every failure into [`crate::Error`].

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::pagination::{MAX_PER_PAGE, NextPage, Pagination, next_page_hint};
use crate::params::QueryParams;
use crate::payload::Payload;

const USER_AGENT: &str = concat!("gitlane/", env!("CARGO_PKG_VERSION"));

/// Shared handle threaded through every builder and facade.
pub(crate) type ApiHandle = Arc<Api>;

pub(crate) struct Api {
    transport: Arc<dyn HttpTransport>,
    /// Normalized origin, e.g. `https://gitlab.example.com`. No trailing slash.
    base_url: String,
    token: Option<String>,
    default_per_page: u32,
    /// Upper bound on the item count a fetch-all traversal may aggregate.
    fetch_all_limit: Option<usize>,
}

impl Api {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: String,
        token: Option<String>,
        default_per_page: u32,
        fetch_all_limit: Option<usize>,
    ) -> Self {
        Self {
            transport,
            base_url,
            token,
            default_per_page,
            fetch_all_limit,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn default_per_page(&self) -> u32 {
        self.default_per_page
    }

    fn url(&self, path: &str, params: &QueryParams) -> String {
        if params.is_empty() {
            format!("{}/api/v4{}", self.base_url, path)
        } else {
            format!("{}/api/v4{}?{}", self.base_url, path, params.encode())
        }
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        // Anonymous mode is legal: without a token the service grants
        // public read-only access.
        if let Some(token) = &self.token {
            headers.push(("PRIVATE-TOKEN".to_string(), token.clone()));
        }
        if with_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: String,
        body: Vec<u8>,
    ) -> Result<HttpResponse> {
        tracing::debug!(method = method.as_str(), %url, "sending request");

        let request = HttpRequest {
            method,
            url,
            headers: self.headers(!body.is_empty()),
            body,
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        tracing::trace!(status = response.status, "response received");
        Ok(response)
    }

    /// Interpret the status line; non-2xx becomes a typed error.
    fn check(resource: &str, response: HttpResponse) -> Result<HttpResponse> {
        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            Err(Error::from_response(
                resource,
                response.status,
                &response.body,
            ))
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body).map_err(|_| Error::UnknownRemote {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })
    }

    /// GET a single object.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T> {
        let response = self.send(HttpMethod::Get, self.url(path, params), Vec::new()).await?;
        let response = Self::check(path, response)?;
        Self::decode(&response)
    }

    /// GET a collection.
    ///
    /// For `Pagination::Page` this returns exactly that page's items, possibly
    /// empty. For `Pagination::All` it walks sequential pages — following the
    /// service's next-page signal, or stopping when a page comes back short —
    /// and concatenates the results. Any page failure fails the whole call.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        pagination: Pagination,
    ) -> Result<Vec<T>> {
        match pagination {
            Pagination::Page { page, per_page } => {
                let mut params = params.clone();
                params.set("page", page);
                params.set("per_page", per_page);
                let response = self
                    .send(HttpMethod::Get, self.url(path, &params), Vec::new())
                    .await?;
                let response = Self::check(path, response)?;
                Self::decode(&response)
            }
            Pagination::All => self.fetch_all(path, params).await,
        }
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>> {
        let per_page = MAX_PER_PAGE;
        let mut page = 1u32;
        let mut items: Vec<T> = Vec::new();

        loop {
            let mut page_params = params.clone();
            page_params.set("page", page);
            page_params.set("per_page", per_page);

            let response = self
                .send(HttpMethod::Get, self.url(path, &page_params), Vec::new())
                .await?;
            let response = Self::check(path, response)?;
            let batch: Vec<T> = Self::decode(&response)?;
            let count = batch.len();
            items.extend(batch);

            tracing::debug!(%path, page, count, total = items.len(), "fetched page");

            if let Some(limit) = self.fetch_all_limit {
                if items.len() > limit {
                    return Err(Error::invalid_argument(format!(
                        "fetch-all for {} exceeded the configured limit of {} items; \
                         request explicit pages instead",
                        path, limit
                    )));
                }
            }

            if count == 0 {
                break;
            }

            match next_page_hint(&response.headers) {
                NextPage::Next(next) => page = next,
                NextPage::End => break,
                NextPage::Unknown => {
                    // No signal from the service: a short page is the last one.
                    if (count as u32) < per_page {
                        break;
                    }
                    page += 1;
                }
            }
        }

        Ok(items)
    }

    /// POST a payload; the response is the created resource.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Payload,
    ) -> Result<T> {
        let url = self.url(path, &QueryParams::new());
        let response = self.send(HttpMethod::Post, url, payload.to_bytes()).await?;
        let response = Self::check(path, response)?;
        Self::decode(&response)
    }

    /// PUT a payload; the response is the updated resource.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Payload,
    ) -> Result<T> {
        let url = self.url(path, &QueryParams::new());
        let response = self.send(HttpMethod::Put, url, payload.to_bytes()).await?;
        let response = Self::check(path, response)?;
        Self::decode(&response)
    }

    /// DELETE by identity. Success carries no body.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path, &QueryParams::new());
        let response = self.send(HttpMethod::Delete, url, Vec::new()).await?;
        Self::check(path, response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::{HttpResponse, MockTransport, header_get};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    const BASE: &str = "https://gitlab.example.com";

    fn api(transport: &MockTransport) -> Api {
        Api::new(
            Arc::new(transport.clone()),
            BASE.to_string(),
            Some("secret-token".to_string()),
            20,
            None,
        )
    }

    fn anonymous_api(transport: &MockTransport) -> Api {
        Api::new(Arc::new(transport.clone()), BASE.to_string(), None, 20, None)
    }

    fn json_page(body: &str, next_page: Option<&str>) -> HttpResponse {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(next) = next_page {
            headers.push(("x-next-page".to_string(), next.to_string()));
        }
        HttpResponse {
            status: 200,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn get_attaches_token_and_standard_headers() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/1"),
            200,
            r#"{"id":1}"#,
        );

        let item: Item = api(&transport)
            .get("/projects/1", &QueryParams::new())
            .await
            .unwrap();
        assert_eq!(item, Item { id: 1 });

        let requests = transport.requests();
        let headers = &requests[0].headers;
        assert_eq!(header_get(headers, "private-token"), Some("secret-token"));
        assert_eq!(header_get(headers, "accept"), Some("application/json"));
        // GET carries no body, so no content type either.
        assert_eq!(header_get(headers, "content-type"), None);
    }

    #[tokio::test]
    async fn anonymous_mode_sends_no_token_header() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/1"),
            200,
            r#"{"id":1}"#,
        );

        let _: Item = anonymous_api(&transport)
            .get("/projects/1", &QueryParams::new())
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(header_get(&requests[0].headers, "private-token"), None);
    }

    #[tokio::test]
    async fn single_page_returns_exactly_that_page() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/items?page=2&per_page=2"),
            200,
            r#"[{"id":3},{"id":4}]"#,
        );

        let items: Vec<Item> = api(&transport)
            .get_list("/items", &QueryParams::new(), Pagination::of(2, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(items, vec![Item { id: 3 }, Item { id: 4 }]);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_page_is_a_valid_result() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/items?page=9&per_page=20"),
            200,
            "[]",
        );

        let items: Vec<Item> = api(&transport)
            .get_list("/items", &QueryParams::new(), Pagination::of(9, 20).unwrap())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_follows_next_page_headers() {
        let transport = MockTransport::new();
        let url = |page: u32| format!("{BASE}/api/v4/items?page={page}&per_page=100");
        transport.push_response(
            HttpMethod::Get,
            url(1),
            json_page(r#"[{"id":1},{"id":2}]"#, Some("2")),
        );
        transport.push_response(
            HttpMethod::Get,
            url(2),
            json_page(r#"[{"id":3},{"id":4}]"#, Some("3")),
        );
        transport.push_response(HttpMethod::Get, url(3), json_page(r#"[{"id":5}]"#, Some("")));

        let items: Vec<Item> = api(&transport)
            .get_list("/items", &QueryParams::new(), Pagination::all())
            .await
            .unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn fetch_all_without_signal_stops_on_short_page() {
        let transport = MockTransport::new();
        let page1: String = {
            let items: Vec<String> = (1..=100).map(|i| format!(r#"{{"id":{i}}}"#)).collect();
            format!("[{}]", items.join(","))
        };
        transport.push_response(
            HttpMethod::Get,
            format!("{BASE}/api/v4/items?page=1&per_page=100"),
            json_page(&page1, None),
        );
        transport.push_response(
            HttpMethod::Get,
            format!("{BASE}/api/v4/items?page=2&per_page=100"),
            json_page(r#"[{"id":101}]"#, None),
        );

        let items: Vec<Item> = api(&transport)
            .get_list("/items", &QueryParams::new(), Pagination::all())
            .await
            .unwrap();
        assert_eq!(items.len(), 101);
        assert_eq!(items.last(), Some(&Item { id: 101 }));
    }

    #[tokio::test]
    async fn fetch_all_fails_whole_call_when_a_later_page_fails() {
        let transport = MockTransport::new();
        let url = |page: u32| format!("{BASE}/api/v4/items?page={page}&per_page=100");
        transport.push_response(
            HttpMethod::Get,
            url(1),
            json_page(r#"[{"id":1}]"#, Some("2")),
        );
        transport.push_response(
            HttpMethod::Get,
            url(2),
            json_page(r#"[{"id":2}]"#, Some("3")),
        );
        transport.push_json(HttpMethod::Get, url(3), 503, "upstream down");

        let result: Result<Vec<Item>> = api(&transport)
            .get_list("/items", &QueryParams::new(), Pagination::all())
            .await;

        // No partial result: pages 1-2 are discarded.
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn fetch_all_enforces_the_configured_limit() {
        let transport = MockTransport::new();
        let url = |page: u32| format!("{BASE}/api/v4/items?page={page}&per_page=100");
        transport.push_response(
            HttpMethod::Get,
            url(1),
            json_page(r#"[{"id":1},{"id":2}]"#, Some("2")),
        );
        transport.push_response(
            HttpMethod::Get,
            url(2),
            json_page(r#"[{"id":3},{"id":4}]"#, Some("3")),
        );

        let api = Api::new(
            Arc::new(transport.clone()),
            BASE.to_string(),
            None,
            20,
            Some(3),
        );
        let result: Result<Vec<Item>> = api
            .get_list("/items", &QueryParams::new(), Pagination::all())
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("limit of 3"));
    }

    #[tokio::test]
    async fn post_sends_json_body_with_content_type() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/api/v4/projects"),
            201,
            r#"{"id":7}"#,
        );

        let payload = Payload::new().put_str("name", "p1");
        let created: Item = api(&transport).post("/projects", &payload).await.unwrap();
        assert_eq!(created.id, 7);

        let requests = transport.requests();
        assert_eq!(
            header_get(&requests[0].headers, "content-type"),
            Some("application/json")
        );
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent, serde_json::json!({"name": "p1"}));
    }

    #[tokio::test]
    async fn delete_accepts_no_content_success() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Delete,
            format!("{BASE}/api/v4/projects/1/repository/branches/b2"),
            HttpResponse {
                status: 204,
                headers: Vec::new(),
                body: Vec::new(),
            },
        );

        api(&transport)
            .delete("/projects/1/repository/branches/b2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn http_404_maps_to_not_found() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/999"),
            404,
            r#"{"message":"404 Project Not Found"}"#,
        );

        let result: Result<Item> = api(&transport).get("/projects/999", &QueryParams::new()).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn transport_failure_maps_to_service_unavailable() {
        // Nothing registered: the mock reports a transport-level failure.
        let transport = MockTransport::new();
        let result: Result<Item> = api(&transport).get("/projects/1", &QueryParams::new()).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn undecodable_success_body_is_unknown_remote() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/api/v4/projects/1"),
            200,
            "<html>surprise</html>",
        );

        let result: Result<Item> = api(&transport).get("/projects/1", &QueryParams::new()).await;
        match result.unwrap_err() {
            Error::UnknownRemote { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("surprise"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
