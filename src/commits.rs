//! Commit resources (read-only: commits are immutable on the remote).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::ApiHandle;
use crate::error::Result;
use crate::pagination::Pagination;
use crate::query::Query;

/// Head-commit summary embedded in branch responses.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub id: String,
    pub short_id: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitData {
    id: String,
    short_id: String,
    title: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    author_email: Option<String>,
    #[serde(default)]
    authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    committer_name: Option<String>,
    #[serde(default)]
    committer_email: Option<String>,
    #[serde(default)]
    committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    parent_ids: Vec<String>,
    #[serde(default)]
    web_url: Option<String>,
}

/// Read-only snapshot of a commit.
#[derive(Debug, Clone)]
pub struct Commit {
    data: CommitData,
}

impl Commit {
    pub(crate) fn bind(data: CommitData) -> Self {
        Self { data }
    }

    /// Full SHA.
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn short_id(&self) -> &str {
        &self.data.short_id
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    pub fn message(&self) -> Option<&str> {
        self.data.message.as_deref()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.data.author_name.as_deref()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.data.author_email.as_deref()
    }

    pub fn authored_date(&self) -> Option<DateTime<Utc>> {
        self.data.authored_date
    }

    pub fn committer_name(&self) -> Option<&str> {
        self.data.committer_name.as_deref()
    }

    pub fn committer_email(&self) -> Option<&str> {
        self.data.committer_email.as_deref()
    }

    pub fn committed_date(&self) -> Option<DateTime<Utc>> {
        self.data.committed_date
    }

    pub fn parent_ids(&self) -> &[String] {
        &self.data.parent_ids
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }
}

/// Query over `/projects/:id/repository/commits`.
pub struct CommitQuery {
    inner: Query<CommitData>,
}

impl CommitQuery {
    pub(crate) fn new(api: ApiHandle, project_id: u64) -> Self {
        Self {
            inner: Query::new(api, format!("/projects/{}/repository/commits", project_id)),
        }
    }

    /// Branch or tag to list from; the service default branch when unset.
    pub fn with_ref_name(mut self, ref_name: &str) -> Self {
        self.inner.set_param("ref_name", ref_name);
        self
    }

    /// Only commits authored at or after this instant.
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.inner.set_param("since", since.to_rfc3339());
        self
    }

    /// Only commits authored at or before this instant.
    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.inner.set_param("until", until.to_rfc3339());
        self
    }

    /// Only commits touching this file path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.inner.set_param("path", path);
        self
    }

    /// Only commits whose author matches this search term.
    pub fn with_author(mut self, author: &str) -> Self {
        self.inner.set_param("author", author);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.inner.set_pagination(pagination);
        self
    }

    pub async fn query(self) -> Result<Vec<Commit>> {
        let rows = self.inner.run().await?;
        Ok(rows.into_iter().map(Commit::bind).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn commit_deserializes_from_api_response() {
        let json = r#"{
            "id": "ed899a2f4b50b4370feeea94676502b42383c746",
            "short_id": "ed899a2f",
            "title": "Replace sanitize with escape once",
            "message": "Replace sanitize with escape once\n\nSee #12\n",
            "author_name": "Example User",
            "author_email": "user@example.com",
            "authored_date": "2021-09-20T11:50:22.001+00:00",
            "committer_name": "Administrator",
            "committer_email": "admin@example.com",
            "committed_date": "2021-09-20T11:50:22.001+00:00",
            "parent_ids": ["6104942438c14ec7bd21c6cd5bd995272b3faff6"],
            "web_url": "https://gitlab.example.com/group/p/-/commit/ed899a2f"
        }"#;

        let commit = Commit::bind(serde_json::from_str(json).unwrap());
        assert_eq!(commit.short_id(), "ed899a2f");
        assert_eq!(commit.title(), "Replace sanitize with escape once");
        assert_eq!(commit.parent_ids().len(), 1);
        assert_eq!(commit.author_email(), Some("user@example.com"));
    }

    #[test]
    fn commit_summary_tolerates_missing_dates() {
        let json = r#"{"id": "abc123def", "short_id": "abc123", "title": "init"}"#;
        let summary: CommitSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.short_id, "abc123");
        assert!(summary.authored_date.is_none());
    }

    #[test]
    fn date_filters_serialize_as_rfc3339() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(since.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }
}
