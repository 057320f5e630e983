use crate::domain::{Commit, Tag};
use crate::error::{PublishError, Result};
use git2::{Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| PublishError::config("repository has no working directory"))
    }

    fn changed_files(&self, oid: Oid) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let Some(path) = path {
                let relative = path
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push(relative);
            }
        }
        Ok(files)
    }
}

impl super::Repository for Git2Repository {
    fn list_commits(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;

        if let Some(rev) = since {
            let boundary = self
                .repo
                .revparse_single(rev)
                .and_then(|object| object.peel_to_commit())
                .map_err(|e| PublishError::config(format!("Cannot resolve '{}': {}", rev, e)))?;
            revwalk.hide(boundary.id())?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            if commit.parent_count() > 1 {
                debug!(sha = %oid, "skipping merge commit");
                continue;
            }

            let message = commit.message().unwrap_or("(empty message)").to_string();
            commits.push(Commit {
                sha: oid.to_string(),
                message,
                files: self.changed_files(oid)?,
            });
        }

        Ok(commits)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let names = self.repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            let commit_sha = match reference.peel_to_commit() {
                Ok(commit) => commit.id().to_string(),
                Err(e) => {
                    debug!(tag = name, error = %e, "tag does not point at a commit");
                    String::new()
                }
            };
            tags.push(Tag::new(name, commit_sha));
        }
        Ok(tags)
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo.tag_delete(name)?;
        Ok(())
    }
}
