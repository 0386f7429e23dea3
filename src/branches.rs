//! Branch resources, scoped to a project.
//!
//! Branches are addressed by name; names may contain `/` and are
//! percent-encoded as a single path segment.

use serde::Deserialize;

use crate::api::ApiHandle;
use crate::commits::CommitSummary;
use crate::error::Result;
use crate::mutation::Creator;
use crate::pagination::Pagination;
use crate::params::{QueryParams, encode_segment};
use crate::payload::Payload;
use crate::query::Query;

fn collection_path(project_id: u64) -> String {
    format!("/projects/{}/repository/branches", project_id)
}

fn member_path(project_id: u64, name: &str) -> String {
    format!(
        "/projects/{}/repository/branches/{}",
        project_id,
        encode_segment(name)
    )
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BranchData {
    name: String,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    protected: bool,
    #[serde(default, rename = "default")]
    is_default: bool,
    #[serde(default)]
    can_push: bool,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    commit: Option<CommitSummary>,
}

/// Read-only snapshot of a branch.
pub struct Branch {
    api: ApiHandle,
    project_id: u64,
    data: BranchData,
}

impl Branch {
    pub(crate) fn bind(api: ApiHandle, project_id: u64, data: BranchData) -> Self {
        Self {
            api,
            project_id,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn merged(&self) -> bool {
        self.data.merged
    }

    pub fn protected(&self) -> bool {
        self.data.protected
    }

    /// Whether this is the project's default branch. The service refuses to
    /// delete the default branch; that rejection surfaces as `InvalidRequest`.
    pub fn is_default(&self) -> bool {
        self.data.is_default
    }

    pub fn can_push(&self) -> bool {
        self.data.can_push
    }

    pub fn web_url(&self) -> Option<&str> {
        self.data.web_url.as_deref()
    }

    /// Head commit at fetch time.
    pub fn commit(&self) -> Option<&CommitSummary> {
        self.data.commit.as_ref()
    }

    /// Delete this branch. After success the branch is no longer queryable.
    pub async fn delete(self) -> Result<()> {
        self.api
            .delete(&member_path(self.project_id, &self.data.name))
            .await
    }
}

/// Fetch one branch by name.
pub(crate) async fn get_branch(api: &ApiHandle, project_id: u64, name: &str) -> Result<Branch> {
    let data: BranchData = api
        .get(&member_path(project_id, name), &QueryParams::new())
        .await?;
    Ok(Branch::bind(api.clone(), project_id, data))
}

/// Query over a project's branches.
pub struct BranchQuery {
    inner: Query<BranchData>,
    api: ApiHandle,
    project_id: u64,
}

impl BranchQuery {
    pub(crate) fn new(api: ApiHandle, project_id: u64) -> Self {
        Self {
            inner: Query::new(api.clone(), collection_path(project_id)),
            api,
            project_id,
        }
    }

    /// Substring match on branch names.
    pub fn with_search(mut self, term: &str) -> Self {
        self.inner.set_param("search", term);
        self
    }

    /// Re2 filter on branch names; mutually overriding with `with_search`
    /// on the server side.
    pub fn with_regex(mut self, regex: &str) -> Self {
        self.inner.set_param("regex", regex);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.inner.set_pagination(pagination);
        self
    }

    pub async fn query(self) -> Result<Vec<Branch>> {
        let project_id = self.project_id;
        let api = self.api;
        let rows = self.inner.run().await?;
        Ok(rows
            .into_iter()
            .map(|data| Branch::bind(api.clone(), project_id, data))
            .collect())
    }
}

/// Pending branch creation. The branch name and starting ref are mandatory
/// and seeded at construction; there are no optional fields.
pub struct BranchCreator {
    inner: Creator<BranchData>,
    project_id: u64,
}

impl BranchCreator {
    pub(crate) fn new(api: ApiHandle, project_id: u64, name: &str, ref_: &str) -> Self {
        let seed = Payload::new().put_str("branch", name).put_str("ref", ref_);
        Self {
            inner: Creator::new(api, collection_path(project_id), seed),
            project_id,
        }
    }

    /// Issue the POST and return the created branch.
    pub async fn create(self) -> Result<Branch> {
        let api = self.inner.api().clone();
        let project_id = self.project_id;
        let data = self.inner.run().await?;
        Ok(Branch::bind(api, project_id, data))
    }
}
