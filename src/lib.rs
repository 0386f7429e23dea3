//! Typed client for the GitLab REST API (v4).
//!
//! The entry point is [`Gitlab`], built from a host and an optional private
//! token. Entities are reached by navigation: the client hands out
//! [`Project`] facades, projects hand out branch, commit, issue and merge
//! request builders. Queries and mutations are staged with chained `with_*`
//! calls and executed with a final `query()`, `create()` or `update()`.
//!
//! ```no_run
//! use gitlane::{Gitlab, Pagination};
//!
//! # async fn run() -> gitlane::Result<()> {
//! let gitlab = Gitlab::from_access_token("gitlab.example.com", "token")?;
//!
//! let project = gitlab.project_by_path("diaspora/diaspora").await?;
//! let branches = project
//!     .branches()
//!     .with_search("release")
//!     .with_pagination(Pagination::all())
//!     .query()
//!     .await?;
//! for branch in &branches {
//!     println!("{}", branch.name());
//! }
//! # Ok(())
//! # }
//! ```

mod api;
pub mod branches;
pub mod client;
pub mod commits;
pub mod error;
pub mod http;
pub mod issues;
pub mod merge_requests;
mod mutation;
pub mod pagination;
mod params;
pub mod payload;
pub mod projects;
mod query;
pub mod users;

pub use branches::{Branch, BranchCreator, BranchQuery};
pub use client::{Gitlab, GitlabBuilder};
pub use commits::{Commit, CommitQuery, CommitSummary};
pub use error::{Error, ErrorKind, Result};
pub use issues::{Issue, IssueCreator, IssueOrderBy, IssueQuery, IssueState, IssueUpdater};
pub use merge_requests::{
    MergeRequest, MergeRequestCreator, MergeRequestOrderBy, MergeRequestQuery, MergeRequestState,
    MergeRequestUpdater,
};
pub use mutation::StateEvent;
pub use pagination::Pagination;
pub use payload::Payload;
pub use projects::{
    Namespace, Project, ProjectCreator, ProjectOrderBy, ProjectQuery, ProjectUpdater, Visibility,
};
pub use query::SortOrder;
pub use users::{User, UserQuery, UserRef};
