//! Main workflow orchestration logic
//!
//! Ties the git collaborator, the release history file and the planning
//! engine together. Kept apart from argument parsing so the workflow can be
//! driven programmatically without depending on clap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, EngineSettings};
use crate::git::{rebase_commit_paths, Repository};
use crate::history::{load_release_history, ReleaseHistory};
use crate::plan::ReleasePlan;

/// Arguments for the plan workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PlanWorkflowArgs {
    /// Workspace root that is scanned for modules
    pub root: PathBuf,

    /// Workspace root relative to the repository root (`""` when they match)
    pub workspace_prefix: String,

    /// Only consider commits after this revision. Without it, each module
    /// only counts commits after the one its latest tag points at.
    pub since: Option<String>,

    /// TOML file with historical releases (and optionally extra tags)
    pub releases_file: Option<PathBuf>,
}

/// What happened to orphaned tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// `behavior.delete_legacy_tags` is off
    Disabled,
    /// These tags were deleted
    Deleted(Vec<String>),
}

/// Plan workflow
///
/// 1. Validate configuration
/// 2. Read commits and tags from the repository, releases from the history file
/// 3. Build the release plan for the workspace, limited to each module's
///    unreleased commits when no `since` revision is given
pub fn run_plan_workflow<R: Repository>(
    args: &PlanWorkflowArgs,
    config: &Config,
    repo: &R,
) -> Result<ReleasePlan> {
    let settings = Arc::new(EngineSettings::from_config(config)?);

    let commits = repo
        .list_commits(args.since.as_deref())
        .context("Failed to list commits")?;
    let commits = rebase_commit_paths(commits, &args.workspace_prefix);

    let history = match &args.releases_file {
        Some(path) => load_release_history(path)
            .with_context(|| format!("Failed to read release history {}", path.display()))?,
        None => ReleaseHistory::default(),
    };

    let mut tags = repo.list_tags().context("Failed to list tags")?;
    for extra in history.tags {
        if !tags.iter().any(|t| t.name == extra.name) {
            tags.push(extra);
        }
    }

    let mode = settings.classifier.mode();
    let mut plan = ReleasePlan::build(&args.root, settings, &commits, &tags, &history.releases)?;
    if args.since.is_none() {
        plan.limit_to_unreleased(&commits);
    }
    info!(
        ?mode,
        modules = plan.modules.len(),
        pending = plan.modules_to_release().len(),
        "release plan ready"
    );

    Ok(plan)
}

/// Delete the plan's orphaned tags that exist in `repo`.
///
/// Does nothing unless `behavior.delete_legacy_tags` is set.
pub fn prune_orphaned_tags<R: Repository>(
    plan: &ReleasePlan,
    config: &Config,
    repo: &R,
) -> Result<PruneOutcome> {
    if !config.behavior.delete_legacy_tags {
        return Ok(PruneOutcome::Disabled);
    }

    let local: Vec<String> = repo.list_tags()?.into_iter().map(|t| t.name).collect();
    let mut deleted = Vec::new();
    for name in plan.orphaned_tags.iter().filter(|n| local.contains(n)) {
        repo.delete_tag(name)
            .with_context(|| format!("Failed to delete tag '{}'", name))?;
        info!(tag = %name, "deleted orphaned tag");
        deleted.push(name.clone());
    }
    Ok(PruneOutcome::Deleted(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commit, Tag};
    use crate::git::MockRepository;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for module in ["network", "storage"] {
            let dir = tmp.path().join(module);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("main.tf"), "").unwrap();
        }
        tmp
    }

    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit(Commit::new("c1", "feat: network", &["network/main.tf"]));
        repo.add_commit(Commit::new("c2", "fix: storage", &["storage/main.tf"]));
        repo.add_tag(Tag::new("network/v1.0.0", "c1"));
        repo.add_tag(Tag::new("legacy/v0.1.0", "c1"));
        repo
    }

    fn args(root: &TempDir) -> PlanWorkflowArgs {
        PlanWorkflowArgs {
            root: root.path().to_path_buf(),
            workspace_prefix: String::new(),
            since: Some("network/v1.0.0".to_string()),
            releases_file: None,
        }
    }

    #[test]
    fn test_plan_workflow() {
        let root = workspace();
        let repo = repo();
        let plan = run_plan_workflow(&args(&root), &Config::default(), &repo).unwrap();

        assert_eq!(plan.orphaned_tags, vec!["legacy/v0.1.0"]);
        let network = plan.module("network").unwrap();
        assert!(!network.needs_release());
        let storage = plan.module("storage").unwrap();
        assert_eq!(storage.next_tag().as_deref(), Some("storage/v1.0.0"));
    }

    #[test]
    fn test_without_since_counts_commits_after_latest_tag() {
        let root = workspace();
        let repo = repo();
        let mut workflow_args = args(&root);
        workflow_args.since = None;

        let plan = run_plan_workflow(&workflow_args, &Config::default(), &repo).unwrap();
        let network = plan.module("network").unwrap();
        assert!(network.commits().is_empty());
        assert!(!network.needs_release());
        let storage = plan.module("storage").unwrap();
        assert_eq!(storage.commits().len(), 1);
    }

    #[test]
    fn test_prune_disabled_by_config() {
        let root = workspace();
        let repo = repo();
        let config = Config::default();
        let plan = run_plan_workflow(&args(&root), &config, &repo).unwrap();

        let outcome = prune_orphaned_tags(&plan, &config, &repo).unwrap();
        assert_eq!(outcome, PruneOutcome::Disabled);
        assert_eq!(repo.list_tags().unwrap().len(), 2);
    }

    #[test]
    fn test_prune_deletes_orphans() {
        let root = workspace();
        let repo = repo();
        let mut config = Config::default();
        config.behavior.delete_legacy_tags = true;

        let plan = run_plan_workflow(&args(&root), &config, &repo).unwrap();
        assert_eq!(
            prune_orphaned_tags(&plan, &config, &repo).unwrap(),
            PruneOutcome::Deleted(vec!["legacy/v0.1.0".to_string()])
        );
        assert_eq!(
            repo.list_tags().unwrap(),
            vec![Tag::new("network/v1.0.0", "c1")]
        );
    }

    #[test]
    fn test_releases_file_feeds_orphans() {
        let root = workspace();
        let repo = repo();
        let history = root.path().join("releases.toml");
        fs::write(
            &history,
            "[[releases]]\nid = 9\ntitle = \"gone-v1.0.0\"\ntag_name = \"gone-v1.0.0\"\n",
        )
        .unwrap();

        let mut workflow_args = args(&root);
        workflow_args.releases_file = Some(history);

        let plan = run_plan_workflow(&workflow_args, &Config::default(), &repo).unwrap();
        assert_eq!(plan.orphaned_releases.len(), 1);
        assert_eq!(plan.orphaned_releases[0].id, 9);
    }

    #[test]
    fn test_invalid_config_fails_before_planning() {
        let root = workspace();
        let repo = repo();
        let mut config = Config::default();
        config.versioning.default_first_version = "one".to_string();

        let err = run_plan_workflow(&args(&root), &config, &repo).unwrap_err();
        assert!(err.to_string().contains("default_first_version"));
    }
}
