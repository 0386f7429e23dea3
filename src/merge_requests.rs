//! Merge request resources, scoped to a project and addressed by `iid`.
//!
//! Source and target branches are foreign-key-like names; resolving them to
//! live branches is an explicit follow-up query, never done implicitly.

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
    format!("/projects/{}/merge_requests", project_id)
}

fn member_path(project_id: u64, iid: u64) -> String {
    format!("/projects/{}/merge_requests/{}", project_id, iid)
}

/// Merge request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Locked,
    Merged,
}

impl MergeRequestState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MergeRequestState::Opened => "opened",
            MergeRequestState::Closed => "closed",
            MergeRequestState::Locked => "locked",
            MergeRequestState::Merged => "merged",
        }
    }
}

/// Sort keys the merge requests endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRequestOrderBy {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl MergeRequestOrderBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MergeRequestOrderBy::CreatedAt => "created_at",
            MergeRequestOrderBy::UpdatedAt => "updated_at",
            MergeRequestOrderBy::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MergeRequestData {
    id: u64,
    iid: u64,
    project_id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    state: MergeRequestState,
    source_branch: String,
    target_branch: String,
    #[serde(default)]
    author: Option<UserRef>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    labels: Vec<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    web_url: Option<String>,
}

/// Read-only snapshot of a merge request.
pub struct MergeRequest {
    api: ApiHandle,
    data: MergeRequestData,
}

impl MergeRequest {
    pub(crate) fn bind(api: ApiHandle, data: MergeRequestData) -> Self {
        Self { api, data }
    }

    pub fn id(&self) -> u64 {
        self.data.id
    }

    /// Sequential id scoped to the parent project.
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

    pub fn state(&self) -> MergeRequestState {
        self.data.state
    }

    /// Name of the branch being merged; a foreign key, not a live branch.
    pub fn source_branch(&self) -> &str {
        &self.data.source_branch
    }

    pub fn target_branch(&self) -> &str {
        &self.data.target_branch
    }

    pub fn author(&self) -> Option<&UserRef> {
        self.data.author.as_ref()
    }

    pub fn draft(&self) -> bool {
        self.data.draft
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.data.updated_at
    }

    pub fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.data.merged_at
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }

    fn updater(&self) -> MergeRequestUpdater {
        MergeRequestUpdater {
            inner: Updater::new(
                self.api.clone(),
                member_path(self.data.project_id, self.data.iid),
            ),
        }
    }

    pub fn with_title(&self, title: &str) -> MergeRequestUpdater {
        self.updater().with_title(title)
    }

    pub fn with_description(&self, description: &str) -> MergeRequestUpdater {
        self.updater().with_description(description)
    }

    pub fn with_target_branch(&self, target: &str) -> MergeRequestUpdater {
        self.updater().with_target_branch(target)
    }

    pub fn with_state_event(&self, event: StateEvent) -> MergeRequestUpdater {
        self.updater().with_state_event(event)
    }

    /// Delete this merge request.
    pub async fn delete(self) -> Result<()> {
        self.api
            .delete(&member_path(self.data.project_id, self.data.iid))
            .await
    }
}

/// Fetch one merge request by project-scoped iid.
pub(crate) async fn get_merge_request(
    api: &ApiHandle,
    project_id: u64,
    iid: u64,
) -> Result<MergeRequest> {
    let data: MergeRequestData = api
        .get(&member_path(project_id, iid), &QueryParams::new())
        .await?;
    Ok(MergeRequest::bind(api.clone(), data))
}

/// Query over a project's merge requests.
pub struct MergeRequestQuery {
    inner: Query<MergeRequestData>,
    api: ApiHandle,
}

impl MergeRequestQuery {
    pub(crate) fn new(api: ApiHandle, project_id: u64) -> Self {
        Self {
            inner: Query::new(api.clone(), collection_path(project_id)),
            api,
        }
    }

    pub fn with_state(mut self, state: MergeRequestState) -> Self {
        self.inner.set_param("state", state.as_str());
        self
    }

    pub fn with_source_branch(mut self, branch: &str) -> Self {
        self.inner.set_param("source_branch", branch);
        self
    }

    pub fn with_target_branch(mut self, branch: &str) -> Self {
        self.inner.set_param("target_branch", branch);
        self
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.inner.set_param("search", term);
        self
    }

    pub fn with_order_by(mut self, order_by: MergeRequestOrderBy) -> Self {
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

    pub async fn query(self) -> Result<Vec<MergeRequest>> {
        let api = self.api;
        let rows = self.inner.run().await?;
        Ok(rows
            .into_iter()
            .map(|data| MergeRequest::bind(api.clone(), data))
            .collect())
    }
}

/// Pending merge request creation; source branch, target branch and title
/// are mandatory.
pub struct MergeRequestCreator {
    inner: Creator<MergeRequestData>,
}

impl MergeRequestCreator {
    pub(crate) fn new(
        api: ApiHandle,
        project_id: u64,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> Self {
        let seed = Payload::new()
            .put_str("source_branch", source_branch)
            .put_str("target_branch", target_branch)
            .put_str("title", title);
        Self {
            inner: Creator::new(api, collection_path(project_id), seed),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_assignee_id(mut self, assignee_id: u64) -> Self {
        self.inner.set("assignee_id", assignee_id);
        self
    }

    /// Ask the service to delete the source branch once merged.
    pub fn with_remove_source_branch(mut self, remove: bool) -> Self {
        self.inner.set("remove_source_branch", remove);
        self
    }

    pub async fn create(self) -> Result<MergeRequest> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(MergeRequest::bind(api, data))
    }
}

/// Pending partial update of a merge request.
pub struct MergeRequestUpdater {
    inner: Updater<MergeRequestData>,
}

impl MergeRequestUpdater {
    pub fn with_title(mut self, title: &str) -> Self {
        self.inner.set("title", title);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_target_branch(mut self, target: &str) -> Self {
        self.inner.set("target_branch", target);
        self
    }

    pub fn with_remove_source_branch(mut self, remove: bool) -> Self {
        self.inner.set("remove_source_branch", remove);
        self
    }

    pub fn with_state_event(mut self, event: StateEvent) -> Self {
        self.inner.set("state_event", event.as_str());
        self
    }

    pub async fn update(self) -> Result<MergeRequest> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(MergeRequest::bind(api, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_request_deserializes_from_api_response() {
        let json = r#"{
            "id": 1,
            "iid": 1,
            "project_id": 3,
            "title": "test1",
            "description": "fixed login page css paddings",
            "state": "merged",
            "source_branch": "test1",
            "target_branch": "main",
            "author": {"id": 1, "username": "admin"},
            "draft": false,
            "labels": ["css"],
            "created_at": "2017-04-29T08:46:00Z",
            "updated_at": "2017-04-29T08:46:00Z",
            "merged_at": "2018-09-07T11:16:17.520Z",
            "web_url": "http://gitlab.example.com/my-group/my-project/merge_requests/1"
        }"#;

        let data: MergeRequestData = serde_json::from_str(json).unwrap();
        assert_eq!(data.state, MergeRequestState::Merged);
        assert_eq!(data.source_branch, "test1");
        assert_eq!(data.target_branch, "main");
        assert!(data.merged_at.is_some());
    }

    #[test]
    fn minimal_merge_request_deserializes() {
        let json = r#"{
            "id": 2, "iid": 5, "project_id": 3, "title": "wip",
            "state": "opened", "source_branch": "f", "target_branch": "main",
            "created_at": "2017-04-29T08:46:00Z"
        }"#;
        let data: MergeRequestData = serde_json::from_str(json).unwrap();
        assert!(!data.draft);
        assert!(data.labels.is_empty());
        assert!(data.author.is_none());
    }

    #[test]
    fn state_values_match_the_endpoint() {
        assert_eq!(MergeRequestState::Opened.as_str(), "opened");
        assert_eq!(MergeRequestState::Merged.as_str(), "merged");
        assert_eq!(MergeRequestState::Locked.as_str(), "locked");
    }
}
