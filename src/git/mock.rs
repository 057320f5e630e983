use crate::domain::{Commit, Tag};
use crate::error::{PublishError, Result};
use crate::git::Repository;
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    commits: Vec<Commit>,
    tags: Mutex<Vec<Tag>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: Mutex::new(Vec::new()),
        }
    }

    /// Append a commit; commits are kept oldest first
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.push(commit);
    }

    /// Add a tag
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tag);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_commits(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let Some(rev) = since else {
            return Ok(self.commits.clone());
        };

        let tags = self.list_tags()?;
        let boundary_sha = tags
            .iter()
            .find(|tag| tag.name == rev)
            .map(|tag| tag.commit_sha.as_str())
            .unwrap_or(rev);

        let position = self
            .commits
            .iter()
            .position(|c| c.sha == boundary_sha)
            .ok_or_else(|| PublishError::config(format!("Cannot resolve '{}'", rev)))?;

        Ok(self.commits[position + 1..].to_vec())
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags = self
            .tags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tags.clone())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        let mut tags = self
            .tags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = tags.len();
        tags.retain(|tag| tag.name != name);
        if tags.len() == before {
            return Err(PublishError::config(format!("tag '{}' not found", name)));
        }
        Ok(())
    }
}
