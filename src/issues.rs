//! Issue resources, scoped to a project and addressed by `iid`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::ApiHandle;
use crate::error::Result;
use crate::mutation::{Creator, StateEvent, Updater};
use crate::pagination::Pagination;
use crate::params::QueryParams;
use crate::payload::Payload;
use crate::query::{Query, SortOrder};
use crate::users::UserRef;

fn collection_path(project_id: u64) -> String {
    format!("/projects/{}/issues", project_id)
}

fn member_path(project_id: u64, iid: u64) -> String {
    format!("/projects/{}/issues/{}", project_id, iid)
}

/// Issue lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Opened,
    Closed,
}

impl IssueState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Opened => "opened",
            IssueState::Closed => "closed",
        }
    }
}

/// Server-side sort keys the issues endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOrderBy {
    CreatedAt,
    UpdatedAt,
    Priority,
}

impl IssueOrderBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueOrderBy::CreatedAt => "created_at",
            IssueOrderBy::UpdatedAt => "updated_at",
            IssueOrderBy::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueData {
    id: u64,
    iid: u64,
    project_id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    state: IssueState,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    author: Option<UserRef>,
    #[serde(default)]
    assignees: Vec<UserRef>,
    #[serde(default)]
    confidential: bool,
    #[serde(default)]
    user_notes_count: u32,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    web_url: Option<String>,
}

/// Read-only snapshot of an issue.
pub struct Issue {
    api: ApiHandle,
    data: IssueData,
}

impl Issue {
    pub(crate) fn bind(api: ApiHandle, data: IssueData) -> Self {
        Self { api, data }
    }

    /// Globally unique id.
    pub fn id(&self) -> u64 {
        self.data.id
    }

    /// Sequential id scoped to the parent project; the id used in paths
    /// and in the project UI.
    pub fn iid(&self) -> u64 {
        self.data.iid
    }

    pub fn project_id(&self) -> u64 {
        self.data.project_id
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    pub fn description(&self) -> Option<&str> {
        self.data.description.as_deref()
    }

    pub fn state(&self) -> IssueState {
        self.data.state
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn author(&self) -> Option<&UserRef> {
        self.data.author.as_ref()
    }

    pub fn assignees(&self) -> &[UserRef] {
        &self.data.assignees
    }

    pub fn confidential(&self) -> bool {
        self.data.confidential
    }

    pub fn user_notes_count(&self) -> u32 {
        self.data.user_notes_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.data.updated_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.data.closed_at
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }

    fn updater(&self) -> IssueUpdater {
        IssueUpdater {
            inner: Updater::new(
                self.api.clone(),
                member_path(self.data.project_id, self.data.iid),
            ),
        }
    }

    pub fn with_title(&self, title: &str) -> IssueUpdater {
        self.updater().with_title(title)
    }

    pub fn with_description(&self, description: &str) -> IssueUpdater {
        self.updater().with_description(description)
    }

    pub fn with_labels<I, S>(&self, labels: I) -> IssueUpdater
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.updater().with_labels(labels)
    }

    pub fn with_assignee_ids<I>(&self, ids: I) -> IssueUpdater
    where
        I: IntoIterator<Item = u64>,
    {
        self.updater().with_assignee_ids(ids)
    }

    pub fn with_confidential(&self, confidential: bool) -> IssueUpdater {
        self.updater().with_confidential(confidential)
    }

    /// Close or reopen via the `state_event` field.
    pub fn with_state_event(&self, event: StateEvent) -> IssueUpdater {
        self.updater().with_state_event(event)
    }

    /// Delete this issue. Subsequent fetches by iid fail with `NotFound`.
    pub async fn delete(self) -> Result<()> {
        self.api
            .delete(&member_path(self.data.project_id, self.data.iid))
            .await
    }
}

/// Fetch one issue by project-scoped iid.
pub(crate) async fn get_issue(api: &ApiHandle, project_id: u64, iid: u64) -> Result<Issue> {
    let data: IssueData = api
        .get(&member_path(project_id, iid), &QueryParams::new())
        .await?;
    Ok(Issue::bind(api.clone(), data))
}

/// Query over a project's issues.
pub struct IssueQuery {
    inner: Query<IssueData>,
    api: ApiHandle,
}

impl IssueQuery {
    pub(crate) fn new(api: ApiHandle, project_id: u64) -> Self {
        Self {
            inner: Query::new(api.clone(), collection_path(project_id)),
            api,
        }
    }

    pub fn with_state(mut self, state: IssueState) -> Self {
        self.inner.set_param("state", state.as_str());
        self
    }

    /// Issues carrying all of these labels. Serialized comma-joined.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = labels
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join(",");
        self.inner.set_param("labels", joined);
        self
    }

    pub fn with_author_id(mut self, author_id: u64) -> Self {
        self.inner.set_param("author_id", author_id);
        self
    }

    /// Full-text search in title and description.
    pub fn with_search(mut self, term: &str) -> Self {
        self.inner.set_param("search", term);
        self
    }

    pub fn with_created_after(mut self, instant: DateTime<Utc>) -> Self {
        self.inner.set_param("created_after", instant.to_rfc3339());
        self
    }

    pub fn with_created_before(mut self, instant: DateTime<Utc>) -> Self {
        self.inner.set_param("created_before", instant.to_rfc3339());
        self
    }

    pub fn with_order_by(mut self, order_by: IssueOrderBy) -> Self {
        self.inner.set_param("order_by", order_by.as_str());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.inner.set_param("sort", sort.as_str());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.inner.set_pagination(pagination);
        self
    }

    pub async fn query(self) -> Result<Vec<Issue>> {
        let api = self.api;
        let rows = self.inner.run().await?;
        Ok(rows
            .into_iter()
            .map(|data| Issue::bind(api.clone(), data))
            .collect())
    }
}

/// Pending issue creation; the title is mandatory.
pub struct IssueCreator {
    inner: Creator<IssueData>,
}

impl IssueCreator {
    pub(crate) fn new(api: ApiHandle, project_id: u64, title: &str) -> Self {
        let seed = Payload::new().put_str("title", title);
        Self {
            inner: Creator::new(api, collection_path(project_id), seed),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = labels
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join(",");
        self.inner.set("labels", joined);
        self
    }

    pub fn with_assignee_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let ids: Vec<serde_json::Value> =
            ids.into_iter().map(serde_json::Value::from).collect();
        self.inner.set("assignee_ids", ids);
        self
    }

    pub fn with_confidential(mut self, confidential: bool) -> Self {
        self.inner.set("confidential", confidential);
        self
    }

    pub async fn create(self) -> Result<Issue> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(Issue::bind(api, data))
    }
}

/// Pending partial update of an issue; only assigned fields travel.
pub struct IssueUpdater {
    inner: Updater<IssueData>,
}

impl IssueUpdater {
    pub fn with_title(mut self, title: &str) -> Self {
        self.inner.set("title", title);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = labels
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join(",");
        self.inner.set("labels", joined);
        self
    }

    pub fn with_assignee_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let ids: Vec<serde_json::Value> =
            ids.into_iter().map(serde_json::Value::from).collect();
        self.inner.set("assignee_ids", ids);
        self
    }

    pub fn with_confidential(mut self, confidential: bool) -> Self {
        self.inner.set("confidential", confidential);
        self
    }

    pub fn with_state_event(mut self, event: StateEvent) -> Self {
        self.inner.set("state_event", event.as_str());
        self
    }

    /// Issue the PUT and return the refreshed issue.
    pub async fn update(self) -> Result<Issue> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(Issue::bind(api, data))
    }
}
