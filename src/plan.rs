//! One planning run: discovery, commit association, history assignment and
//! orphan detection, in that order.

use crate::config::EngineSettings;
use crate::discovery::{associate_commits, discover_modules, AssociationReport};
use crate::domain::{Commit, Release, Tag};
use crate::error::Result;
use crate::module::{assign_history, ModuleRecord};
use crate::orphans::{releases_to_delete, tags_to_delete};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Result of a planning run. Module records are read-only from here on.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub modules: Vec<ModuleRecord>,
    pub association: AssociationReport,
    pub orphaned_tags: Vec<String>,
    pub orphaned_releases: Vec<Release>,
}

impl ReleasePlan {
    /// Plan releases for the workspace at `root`.
    ///
    /// Commit file paths must be relative to `root`. Each module receives the
    /// tags and releases associated with its name; whatever matches no module
    /// ends up in the orphan lists.
    pub fn build(
        root: &Path,
        settings: Arc<EngineSettings>,
        commits: &[Commit],
        tags: &[Tag],
        releases: &[Release],
    ) -> Result<Self> {
        let modules = discover_modules(root, Arc::clone(&settings))?;
        Self::from_modules(modules, &settings, commits, tags, releases)
    }

    /// Plan releases for an already discovered module set.
    pub fn from_modules(
        mut modules: Vec<ModuleRecord>,
        settings: &EngineSettings,
        commits: &[Commit],
        tags: &[Tag],
        releases: &[Release],
    ) -> Result<Self> {
        let association = associate_commits(&mut modules, commits, settings);
        assign_history(&mut modules, tags, releases)?;

        let orphaned_tags = tags_to_delete(tags, &modules);
        let orphaned_releases = releases_to_delete(releases, &modules);

        Ok(ReleasePlan {
            modules,
            association,
            orphaned_tags,
            orphaned_releases,
        })
    }

    /// Modules that need a release, in name order
    pub fn modules_to_release(&self) -> Vec<&ModuleRecord> {
        let mut pending: Vec<&ModuleRecord> =
            self.modules.iter().filter(|m| m.needs_release()).collect();
        pending.sort_by(|a, b| a.name().cmp(b.name()));
        pending
    }

    /// Drop, per module, the commits up to and including the one its latest
    /// tag points at, so only unreleased work counts.
    ///
    /// `history` is the commit list the plan was built from, oldest first.
    /// A module whose tagged commit is not in `history` keeps every commit.
    pub fn limit_to_unreleased(&mut self, history: &[Commit]) {
        let positions: HashMap<&str, usize> = history
            .iter()
            .enumerate()
            .map(|(index, commit)| (commit.sha.as_str(), index))
            .collect();

        for module in &mut self.modules {
            let Some(tag) = module.latest_tag() else {
                continue;
            };
            let Some(&boundary) = positions.get(tag.commit_sha.as_str()) else {
                debug!(module = module.name(), tag = %tag.name, "tagged commit not in history");
                continue;
            };
            module.retain_commits(|commit| {
                positions
                    .get(commit.sha.as_str())
                    .map_or(true, |&index| index > boundary)
            });
        }
    }

    /// Look up a module by name
    pub fn module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.iter().find(|m| m.name() == name)
    }
}
