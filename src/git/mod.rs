//! Git operations abstraction layer
//!
//! Supplies the commit and tag history the planning engine consumes, and
//! removes tags that the orphan detector reports. The engine itself never
//! touches git; only the binary drives these collaborators.
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{Commit, Tag};
use crate::error::Result;

/// Source of repository history
pub trait Repository {
    /// Commits reachable from HEAD and not from `since`, oldest first.
    ///
    /// Each commit lists the paths it changed relative to its first parent,
    /// `/`-separated and relative to the repository root. Merge commits are
    /// left out since their changes arrive through the merged commits.
    ///
    /// # Arguments
    /// * `since` - Revision (tag name, sha, or anything git can resolve) whose
    ///   history is excluded; `None` lists the whole history
    ///
    /// # Returns
    /// * `Ok(Vec<Commit>)` - Commits in topological order, oldest first
    /// * `Err` - If `since` cannot be resolved or the walk fails
    ///
    /// # Examples
    /// ```ignore
    /// let commits = repo.list_commits(Some("network/v1.2.0"))?;
    /// // only commits made after network/v1.2.0
    /// ```
    fn list_commits(&self, since: Option<&str>) -> Result<Vec<Commit>>;

    /// Every tag in the repository with the commit it points at.
    ///
    /// Annotated tags are peeled to their commit.
    ///
    /// # Returns
    /// * `Ok(Vec<Tag>)` - All tags, in the order the backend reports them
    /// * `Err` - If the tag references cannot be read
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Delete a local tag
    ///
    /// # Arguments
    /// * `name` - Full tag name, e.g. `legacy/v0.1.0`
    ///
    /// # Returns
    /// * `Ok(())` - The tag was removed
    /// * `Err` - If no such tag exists or it cannot be deleted
    fn delete_tag(&self, name: &str) -> Result<()>;
}

/// Rewrite repository-relative paths to be relative to `prefix`, dropping
/// files outside it. An empty prefix leaves commits unchanged.
pub fn rebase_commit_paths(commits: Vec<Commit>, prefix: &str) -> Vec<Commit> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return commits;
    }

    commits
        .into_iter()
        .map(|mut commit| {
            commit.files = commit
                .files
                .iter()
                .filter_map(|file| {
                    file.strip_prefix(prefix)
                        .and_then(|rest| rest.strip_prefix('/'))
                        .map(str::to_string)
                })
                .collect();
            commit
        })
        .collect()
}
