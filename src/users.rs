//! User resources.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::ApiHandle;
use crate::error::Result;
use crate::pagination::Pagination;
use crate::query::Query;

/// Abbreviated user reference embedded in other resources (author,
/// assignee). Never fetched on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserData {
    id: u64,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    public_email: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Read-only snapshot of a user account.
#[derive(Debug, Clone)]
pub struct User {
    data: UserData,
}

impl User {
    pub(crate) fn bind(data: UserData) -> Self {
        Self { data }
    }

    pub fn id(&self) -> u64 {
        self.data.id
    }

    pub fn username(&self) -> &str {
        &self.data.username
    }

    pub fn name(&self) -> Option<&str> {
        self.data.name.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.data.state.as_deref()
    }

    /// Primary email, falling back to the public one when privacy settings
    /// hide the primary.
    pub fn email(&self) -> Option<&str> {
        self.data
            .email
            .as_deref()
            .or(self.data.public_email.as_deref())
    }

    pub fn bio(&self) -> Option<&str> {
        self.data.bio.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.data.avatar_url.as_deref()
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.data.created_at
    }
}

/// Query over `/users`.
pub struct UserQuery {
    inner: Query<UserData>,
}

impl UserQuery {
    pub(crate) fn new(api: ApiHandle) -> Self {
        Self {
            inner: Query::new(api, "/users"),
        }
    }

    /// Exact username lookup.
    pub fn with_username(mut self, username: &str) -> Self {
        self.inner.set_param("username", username);
        self
    }

    /// Fuzzy search on name/username/email.
    pub fn with_search(mut self, term: &str) -> Self {
        self.inner.set_param("search", term);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.inner.set_param("active", active);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.inner.set_pagination(pagination);
        self
    }

    pub async fn query(self) -> Result<Vec<User>> {
        let rows = self.inner.run().await?;
        Ok(rows.into_iter().map(User::bind).collect())
    }
}
