//! Project resources and the child builders they scope.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::ApiHandle;
use crate::branches::{self, Branch, BranchCreator, BranchQuery};
use crate::commits::CommitQuery;
use crate::error::Result;
use crate::issues::{self, Issue, IssueCreator, IssueQuery};
use crate::merge_requests::{self, MergeRequest, MergeRequestCreator, MergeRequestQuery};
use crate::mutation::{Creator, Updater};
use crate::pagination::Pagination;
use crate::params::{QueryParams, encode_segment};
use crate::payload::Payload;
use crate::query::{Query, SortOrder};

fn member_path(id: u64) -> String {
    format!("/projects/{}", id)
}

/// Project visibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

/// Sort keys the projects endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrderBy {
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
    LastActivityAt,
    StarCount,
}

impl ProjectOrderBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectOrderBy::Id => "id",
            ProjectOrderBy::Name => "name",
            ProjectOrderBy::CreatedAt => "created_at",
            ProjectOrderBy::UpdatedAt => "updated_at",
            ProjectOrderBy::LastActivityAt => "last_activity_at",
            ProjectOrderBy::StarCount => "star_count",
        }
    }
}

/// Namespace (group or user) a project lives under.
#[derive(Debug, Clone, Deserialize)]
pub struct Namespace {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub full_path: String,
    /// `"group"` or `"user"`.
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectData {
    id: u64,
    name: String,
    path: String,
    path_with_namespace: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    visibility: Visibility,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    star_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    open_issues_count: Option<u32>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    namespace: Option<Namespace>,
    #[serde(default)]
    web_url: Option<String>,
}

/// Read-only snapshot of a project, and the root of all entity-scoped
/// builders: branches, commits, issues and merge requests hang off it.
pub struct Project {
    api: ApiHandle,
    data: ProjectData,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl Project {
    pub(crate) fn bind(api: ApiHandle, data: ProjectData) -> Self {
        Self { api, data }
    }

    pub fn id(&self) -> u64 {
        self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// URL slug.
    pub fn path(&self) -> &str {
        &self.data.path
    }

    /// Full path including namespace, e.g. `group/subgroup/project`.
    pub fn path_with_namespace(&self) -> &str {
        &self.data.path_with_namespace
    }

    pub fn description(&self) -> Option<&str> {
        self.data.description.as_deref()
    }

    pub fn default_branch(&self) -> Option<&str> {
        self.data.default_branch.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.data.visibility
    }

    pub fn archived(&self) -> bool {
        self.data.archived
    }

    pub fn topics(&self) -> &[String] {
        &self.data.topics
    }

    pub fn star_count(&self) -> u32 {
        self.data.star_count
    }

    pub fn forks_count(&self) -> u32 {
        self.data.forks_count
    }

    pub fn open_issues_count(&self) -> Option<u32> {
        self.data.open_issues_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.created_at
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.data.last_activity_at
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.data.namespace.as_ref()
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }

    // ---- child builders, scoped to this project ----

    pub fn branches(&self) -> BranchQuery {
        BranchQuery::new(self.api.clone(), self.data.id)
    }

    pub async fn branch(&self, name: &str) -> Result<Branch> {
        branches::get_branch(&self.api, self.data.id, name).await
    }

    /// Stage a new branch cut from `ref_` (a branch name, tag or SHA).
    pub fn new_branch(&self, name: &str, ref_: &str) -> BranchCreator {
        BranchCreator::new(self.api.clone(), self.data.id, name, ref_)
    }

    pub fn commits(&self) -> CommitQuery {
        CommitQuery::new(self.api.clone(), self.data.id)
    }

    pub fn issues(&self) -> IssueQuery {
        IssueQuery::new(self.api.clone(), self.data.id)
    }

    pub async fn issue(&self, iid: u64) -> Result<Issue> {
        issues::get_issue(&self.api, self.data.id, iid).await
    }

    pub fn new_issue(&self, title: &str) -> IssueCreator {
        IssueCreator::new(self.api.clone(), self.data.id, title)
    }

    pub fn merge_requests(&self) -> MergeRequestQuery {
        MergeRequestQuery::new(self.api.clone(), self.data.id)
    }

    pub async fn merge_request(&self, iid: u64) -> Result<MergeRequest> {
        merge_requests::get_merge_request(&self.api, self.data.id, iid).await
    }

    pub fn new_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> MergeRequestCreator {
        MergeRequestCreator::new(
            self.api.clone(),
            self.data.id,
            source_branch,
            target_branch,
            title,
        )
    }

    // ---- mutation ----

    fn updater(&self) -> ProjectUpdater {
        ProjectUpdater {
            inner: Updater::new(self.api.clone(), member_path(self.data.id)),
        }
    }

    pub fn with_name(&self, name: &str) -> ProjectUpdater {
        self.updater().with_name(name)
    }

    pub fn with_description(&self, description: &str) -> ProjectUpdater {
        self.updater().with_description(description)
    }

    pub fn with_default_branch(&self, branch: &str) -> ProjectUpdater {
        self.updater().with_default_branch(branch)
    }

    pub fn with_visibility(&self, visibility: Visibility) -> ProjectUpdater {
        self.updater().with_visibility(visibility)
    }

    pub fn with_topics<I, S>(&self, topics: I) -> ProjectUpdater
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.updater().with_topics(topics)
    }

    /// Delete this project and everything under it.
    pub async fn delete(self) -> Result<()> {
        self.api.delete(&member_path(self.data.id)).await
    }
}

/// Fetch one project by numeric id.
pub(crate) async fn get_project(api: &ApiHandle, id: u64) -> Result<Project> {
    let data: ProjectData = api.get(&member_path(id), &QueryParams::new()).await?;
    Ok(Project::bind(api.clone(), data))
}

/// Fetch one project by full path, e.g. `group/project`.
pub(crate) async fn get_project_by_path(api: &ApiHandle, path: &str) -> Result<Project> {
    let member = format!("/projects/{}", encode_segment(path));
    let data: ProjectData = api.get(&member, &QueryParams::new()).await?;
    Ok(Project::bind(api.clone(), data))
}

/// Query over `/projects`.
pub struct ProjectQuery {
    inner: Query<ProjectData>,
    api: ApiHandle,
}

impl ProjectQuery {
    pub(crate) fn new(api: ApiHandle) -> Self {
        Self {
            inner: Query::new(api.clone(), "/projects"),
            api,
        }
    }

    /// Substring search on name and path.
    pub fn with_search(mut self, term: &str) -> Self {
        self.inner.set_param("search", term);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.inner.set_param("visibility", visibility.as_str());
        self
    }

    /// Only projects owned by the authenticated user.
    pub fn with_owned(mut self, owned: bool) -> Self {
        self.inner.set_param("owned", owned);
        self
    }

    /// Only projects the authenticated user is a member of.
    pub fn with_membership(mut self, membership: bool) -> Self {
        self.inner.set_param("membership", membership);
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.inner.set_param("archived", archived);
        self
    }

    pub fn with_order_by(mut self, order_by: ProjectOrderBy) -> Self {
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

    pub async fn query(self) -> Result<Vec<Project>> {
        let api = self.api;
        let rows = self.inner.run().await?;
        Ok(rows
            .into_iter()
            .map(|data| Project::bind(api.clone(), data))
            .collect())
    }
}

/// Pending project creation; the name is mandatory.
pub struct ProjectCreator {
    inner: Creator<ProjectData>,
}

impl ProjectCreator {
    pub(crate) fn new(api: ApiHandle, name: &str) -> Self {
        let seed = Payload::new().put_str("name", name);
        Self {
            inner: Creator::new(api, "/projects", seed),
        }
    }

    /// URL slug; derived from the name when unset.
    pub fn with_path(mut self, path: &str) -> Self {
        self.inner.set("path", path);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.inner.set("visibility", visibility.as_str());
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.inner.set("default_branch", branch);
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: Vec<serde_json::Value> = topics
            .into_iter()
            .map(|t| serde_json::Value::String(t.into()))
            .collect();
        self.inner.set("topics", topics);
        self
    }

    /// Seed the repository with an initial commit so branches can be cut
    /// immediately.
    pub fn with_initialize_with_readme(mut self, initialize: bool) -> Self {
        self.inner.set("initialize_with_readme", initialize);
        self
    }

    pub async fn create(self) -> Result<Project> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(Project::bind(api, data))
    }
}

/// Pending partial update of a project.
pub struct ProjectUpdater {
    inner: Updater<ProjectData>,
}

impl ProjectUpdater {
    pub fn with_name(mut self, name: &str) -> Self {
        self.inner.set("name", name);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.inner.set("description", description);
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.inner.set("default_branch", branch);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.inner.set("visibility", visibility.as_str());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: Vec<serde_json::Value> = topics
            .into_iter()
            .map(|t| serde_json::Value::String(t.into()))
            .collect();
        self.inner.set("topics", topics);
        self
    }

    /// Issue the PUT and return the refreshed project.
    pub async fn update(self) -> Result<Project> {
        let api = self.inner.api().clone();
        let data = self.inner.run().await?;
        Ok(Project::bind(api, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "id": 3,
        "name": "Diaspora Project Site",
        "path": "diaspora-project-site",
        "path_with_namespace": "diaspora/diaspora-project-site",
        "description": "Lorem ipsum",
        "default_branch": "main",
        "visibility": "private",
        "archived": false,
        "topics": ["example", "disapora project"],
        "star_count": 5,
        "forks_count": 2,
        "open_issues_count": 1,
        "created_at": "2013-09-30T13:46:02Z",
        "last_activity_at": "2013-09-30T13:46:02Z",
        "namespace": {
            "id": 3,
            "name": "Diaspora",
            "path": "diaspora",
            "full_path": "diaspora",
            "kind": "group"
        },
        "web_url": "https://gitlab.example.com/diaspora/diaspora-project-site"
    }"#;

    #[test]
    fn project_deserializes_from_api_response() {
        let data: ProjectData = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(data.id, 3);
        assert_eq!(data.visibility, Visibility::Private);
        assert_eq!(data.default_branch.as_deref(), Some("main"));
        assert_eq!(data.star_count, 5);
        let ns = data.namespace.unwrap();
        assert_eq!(ns.kind, "group");
        assert_eq!(ns.full_path, "diaspora");
    }

    #[test]
    fn project_deserializes_from_minimal_response() {
        let json = r#"{
            "id": 1,
            "name": "p",
            "path": "p",
            "path_with_namespace": "me/p",
            "visibility": "public",
            "created_at": "2013-09-30T13:46:02Z"
        }"#;
        let data: ProjectData = serde_json::from_str(json).unwrap();
        assert!(!data.archived);
        assert!(data.topics.is_empty());
        assert!(data.namespace.is_none());
        assert!(data.open_issues_count.is_none());
    }

    #[test]
    fn order_by_values_match_the_endpoint() {
        assert_eq!(ProjectOrderBy::LastActivityAt.as_str(), "last_activity_at");
        assert_eq!(ProjectOrderBy::StarCount.as_str(), "star_count");
    }

    #[test]
    fn visibility_round_trips_between_wire_and_enum() {
        let v: Visibility = serde_json::from_str(r#""internal""#).unwrap();
        assert_eq!(v, Visibility::Internal);
        assert_eq!(v.as_str(), "internal");
    }
}
