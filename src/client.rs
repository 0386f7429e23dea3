//! Root client: construction, authentication context, client-rooted
//! operations.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{Api, ApiHandle};
use crate::error::{Error, Result};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::params::QueryParams;
use crate::projects::{self, Project, ProjectCreator, ProjectQuery};
use crate::users::{User, UserData, UserQuery};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`Gitlab`].
///
/// The host may be given with or without a scheme; it is normalized to
/// `https://host`. A token is optional: anonymous clients get the service's
/// public read-only surface.
pub struct GitlabBuilder {
    host: String,
    token: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    timeout: Duration,
    default_per_page: u32,
    fetch_all_limit: Option<usize>,
}

impl GitlabBuilder {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            token: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            default_per_page: DEFAULT_PER_PAGE,
            fetch_all_limit: None,
        }
    }

    /// Authenticate with a private access token.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Transport timeout for each request. Ignored when a custom transport
    /// is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Page size used when a query doesn't override pagination.
    pub fn default_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page;
        self
    }

    /// Upper bound on how many items a fetch-all traversal may aggregate
    /// before failing. Unbounded when unset.
    pub fn fetch_all_limit(mut self, limit: usize) -> Self {
        self.fetch_all_limit = Some(limit);
        self
    }

    /// Swap the HTTP transport (tests, instrumentation).
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Gitlab> {
        if self.default_per_page < 1 || self.default_per_page > MAX_PER_PAGE {
            return Err(Error::invalid_argument(format!(
                "default_per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        // Accept "gitlab.example.com" and "https://gitlab.example.com/" alike.
        let host = self
            .host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::invalid_argument("host must not be empty"));
        }
        let base_url = format!("https://{}", host);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::with_timeout(self.timeout)
                    .map_err(|e| Error::transport(e.to_string()))?,
            ),
        };

        Ok(Gitlab {
            api: Arc::new(Api::new(
                transport,
                base_url,
                self.token,
                self.default_per_page,
                self.fetch_all_limit,
            )),
        })
    }
}

/// The root entity: holds the requestor, authentication context and base
/// URL, all immutable for the client's lifetime. Every other facade and
/// builder is reached from here.
#[derive(Clone)]
pub struct Gitlab {
    api: ApiHandle,
}

impl std::fmt::Debug for Gitlab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gitlab")
            .field("base_url", &self.api.base_url())
            .finish_non_exhaustive()
    }
}

impl Gitlab {
    pub fn builder(host: &str) -> GitlabBuilder {
        GitlabBuilder::new(host)
    }

    /// Shorthand for the common case: host + token, defaults elsewhere.
    pub fn from_access_token(host: &str, token: &str) -> Result<Self> {
        GitlabBuilder::new(host).token(token).build()
    }

    /// Anonymous client with public read-only access.
    pub fn anonymous(host: &str) -> Result<Self> {
        GitlabBuilder::new(host).build()
    }

    /// Normalized origin this client talks to.
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    // ---- client-rooted operations ----

    pub fn projects(&self) -> ProjectQuery {
        ProjectQuery::new(self.api.clone())
    }

    pub async fn project(&self, id: u64) -> Result<Project> {
        projects::get_project(&self.api, id).await
    }

    /// Look a project up by its full path, e.g. `group/project`.
    pub async fn project_by_path(&self, path: &str) -> Result<Project> {
        projects::get_project_by_path(&self.api, path).await
    }

    pub fn new_project(&self, name: &str) -> ProjectCreator {
        ProjectCreator::new(self.api.clone(), name)
    }

    pub fn users(&self) -> UserQuery {
        UserQuery::new(self.api.clone())
    }

    pub async fn user(&self, id: u64) -> Result<User> {
        let data: UserData = self
            .api
            .get(&format!("/users/{}", id), &QueryParams::new())
            .await?;
        Ok(User::bind(data))
    }

    /// The authenticated user. Fails with `Unauthorized` for anonymous
    /// clients.
    pub async fn current_user(&self) -> Result<User> {
        let data: UserData = self.api.get("/user", &QueryParams::new()).await?;
        Ok(User::bind(data))
    }
}
