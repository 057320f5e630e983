//! Per-module release state: attached commits, sorted history, and the
//! release decisions derived from them.

use crate::analyzer::CommitAnalysis;
use crate::config::EngineSettings;
use crate::domain::{
    extract_version, is_associated, module_name_from_path, Commit, Release, ReleaseType, Tag,
    Version, VersionedName,
};
use crate::error::Result;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a module is scheduled for release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The module has never been tagged
    Initial,
    /// Commits touched the module since its last release
    DirectChanges,
}

impl fmt::Display for ReleaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseReason::Initial => f.write_str("initial"),
            ReleaseReason::DirectChanges => f.write_str("direct-changes"),
        }
    }
}

/// A discovered module and everything known about its releases
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    name: String,
    directory: PathBuf,
    relative_path: String,
    commits: Vec<Commit>,
    commit_shas: HashSet<String>,
    tags: Vec<Tag>,
    releases: Vec<Release>,
    settings: Arc<EngineSettings>,
}

impl ModuleRecord {
    /// Create a record for the module at `relative_path` (workspace-relative,
    /// `/`-separated). The name is derived from the path.
    pub fn new(
        relative_path: impl Into<String>,
        directory: impl Into<PathBuf>,
        settings: Arc<EngineSettings>,
    ) -> Self {
        let relative_path = relative_path.into();
        let name = module_name_from_path(&relative_path, settings.tag_separator);
        ModuleRecord {
            name,
            directory: directory.into(),
            relative_path,
            commits: Vec::new(),
            commit_shas: HashSet::new(),
            tags: Vec::new(),
            releases: Vec::new(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute module directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Module directory relative to the workspace root
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Attached commits in the order they were added
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Tags, newest version first
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Releases, newest version first
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Attach a commit; returns `false` when a commit with the same sha is
    /// already attached.
    pub fn add_commit(&mut self, commit: &Commit) -> bool {
        if !self.commit_shas.insert(commit.sha.clone()) {
            return false;
        }
        self.commits.push(commit.clone());
        true
    }

    /// Keep only the attached commits for which `keep` returns `true`.
    pub fn retain_commits<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Commit) -> bool,
    {
        self.commits.retain(|commit| keep(commit));
        self.commit_shas = self.commits.iter().map(|c| c.sha.clone()).collect();
    }

    /// Replace all tags, sorted newest version first.
    ///
    /// # Arguments
    /// * `tags` - Tags whose names are `{module}{sep}[v]X.Y.Z` for any valid
    ///   separator
    ///
    /// # Returns
    /// * `Ok(())` - Tags stored in descending version order
    /// * `Err(PublishError::Validation)` - A tag belongs to another module or
    ///   carries no version; the previous tags are kept
    pub fn set_tags(&mut self, tags: Vec<Tag>) -> Result<()> {
        self.tags = self.sort_by_version(tags)?;
        Ok(())
    }

    /// Replace all releases. Every release title must belong to this module
    /// and carry a version, otherwise nothing is replaced.
    pub fn set_releases(&mut self, releases: Vec<Release>) -> Result<()> {
        self.releases = self.sort_by_version(releases)?;
        Ok(())
    }

    fn sort_by_version<T: VersionedName>(&self, entries: Vec<T>) -> Result<Vec<T>> {
        let mut versioned = entries
            .into_iter()
            .map(|entry| {
                extract_version(entry.versioned_name(), &self.name).map(|version| (version, entry))
            })
            .collect::<Result<Vec<(Version, T)>>>()?;

        versioned.sort_by(|(va, a), (vb, b)| {
            vb.cmp(va)
                .then_with(|| a.versioned_name().cmp(b.versioned_name()))
        });

        Ok(versioned.into_iter().map(|(_, entry)| entry).collect())
    }

    pub fn latest_tag(&self) -> Option<&Tag> {
        self.tags.first()
    }

    /// Version of the newest tag
    pub fn latest_version(&self) -> Option<Version> {
        self.latest_tag()
            .and_then(|tag| extract_version(&tag.name, &self.name).ok())
    }

    /// Whether the module should be released.
    ///
    /// # Returns
    /// * `true` - The module has no tags yet, or at least one commit is attached
    /// * `false` - The module is tagged and nothing touched it since
    pub fn needs_release(&self) -> bool {
        self.tags.is_empty() || !self.commits.is_empty()
    }

    pub fn release_reasons(&self) -> Vec<ReleaseReason> {
        let mut reasons = Vec::new();
        if self.tags.is_empty() {
            reasons.push(ReleaseReason::Initial);
        }
        if !self.commits.is_empty() {
            reasons.push(ReleaseReason::DirectChanges);
        }
        reasons
    }

    /// Classification of the attached commits
    pub fn commit_analysis(&self) -> CommitAnalysis {
        self.settings.classifier.analyze(&self.commits)
    }

    /// Release type for the next release.
    ///
    /// Attached commits are classified and the highest vote wins; when none
    /// of them votes, or the module was never released, the configured
    /// default level applies.
    ///
    /// # Returns
    /// * `Some(ReleaseType)` - Severity of the next release
    /// * `None` - No release is needed
    pub fn release_type(&self) -> Option<ReleaseType> {
        if !self.commits.is_empty() {
            let voted = self.commit_analysis().release_type;
            return Some(voted.unwrap_or(self.settings.default_release_type));
        }
        if self.tags.is_empty() {
            return Some(self.settings.default_release_type);
        }
        None
    }

    /// Version of the next release: the latest tag bumped by
    /// [`release_type`](Self::release_type), or the configured first version
    /// for a module that was never tagged. `None` when no release is needed.
    pub fn next_version(&self) -> Option<Version> {
        let release_type = self.release_type()?;
        Some(crate::domain::next_version(
            self.latest_version(),
            release_type,
            self.settings.default_first_version,
        ))
    }

    /// Next version rendered with the configured prefix (e.g. `v1.3.0`)
    pub fn next_version_string(&self) -> Option<String> {
        self.next_version()
            .map(|version| version.render(self.settings.use_version_prefix))
    }

    /// Name of the tag the next release should carry.
    ///
    /// # Returns
    /// * `Some(String)` - `{name}{separator}{next version}`
    /// * `None` - No release is needed
    ///
    /// # Examples
    /// ```ignore
    /// // module "network" tagged network/v1.2.3, one "feat: ..." commit attached
    /// assert_eq!(module.next_tag().as_deref(), Some("network/v1.3.0"));
    /// ```
    pub fn next_tag(&self) -> Option<String> {
        self.next_version_string().map(|version| {
            format!("{}{}{}", self.name, self.settings.tag_separator, version)
        })
    }
}

/// Entries of `all` associated with `module_name`, in input order
pub fn history_for_module<T: VersionedName + Clone>(all: &[T], module_name: &str) -> Vec<T> {
    all.iter()
        .filter(|entry| is_associated(module_name, entry.versioned_name()))
        .cloned()
        .collect()
}

pub fn tags_for_module(all: &[Tag], module_name: &str) -> Vec<Tag> {
    history_for_module(all, module_name)
}

pub fn releases_for_module(all: &[Release], module_name: &str) -> Vec<Release> {
    history_for_module(all, module_name)
}

/// Give every module its slice of the historical tags and releases.
pub fn assign_history(modules: &mut [ModuleRecord], tags: &[Tag], releases: &[Release]) -> Result<()> {
    for module in modules.iter_mut() {
        let module_tags = tags_for_module(tags, module.name());
        let module_releases = releases_for_module(releases, module.name());
        module.set_tags(module_tags)?;
        module.set_releases(module_releases)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassificationMode, Config};

    fn settings(configure: impl FnOnce(&mut Config)) -> Arc<EngineSettings> {
        let mut config = Config::default();
        configure(&mut config);
        Arc::new(EngineSettings::from_config(&config).unwrap())
    }

    fn record(path: &str) -> ModuleRecord {
        ModuleRecord::new(path, format!("/repo/{}", path), settings(|_| {}))
    }

    #[test]
    fn test_name_derived_from_path() {
        let module = ModuleRecord::new(
            "Modules/AWS VPC",
            "/repo/Modules/AWS VPC",
            settings(|c| c.versioning.tag_separator = '-'),
        );
        assert_eq!(module.name(), "modules-aws-vpc");
        assert_eq!(module.relative_path(), "Modules/AWS VPC");
    }

    #[test]
    fn test_add_commit_dedupes_by_sha() {
        let mut module = record("network");
        let commit = Commit::new("abc", "fix: a", &["network/main.tf", "network/vars.tf"]);
        assert!(module.add_commit(&commit));
        assert!(!module.add_commit(&commit));
        assert_eq!(module.commits().len(), 1);
    }

    #[test]
    fn test_set_tags_sorts_numerically_descending() {
        let mut module = record("network");
        module
            .set_tags(vec![
                Tag::new("network/v1.9.0", "a"),
                Tag::new("network/v1.10.0", "b"),
                Tag::new("network/v0.2.0", "c"),
            ])
            .unwrap();
        let names: Vec<&str> = module.tags().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["network/v1.10.0", "network/v1.9.0", "network/v0.2.0"]);
        assert_eq!(module.latest_version(), Some(Version::new(1, 10, 0)));
    }

    #[test]
    fn test_set_tags_rejects_foreign_tag() {
        let mut module = record("network");
        module.set_tags(vec![Tag::new("network/v1.0.0", "a")]).unwrap();

        let err = module
            .set_tags(vec![
                Tag::new("network/v2.0.0", "b"),
                Tag::new("storage/v1.0.0", "c"),
            ])
            .unwrap_err();
        assert!(err.is_validation());
        // failed assignment leaves the previous tags in place
        assert_eq!(module.tags().len(), 1);
        assert_eq!(module.tags()[0].name, "network/v1.0.0");
    }

    #[test]
    fn test_set_releases_validates_titles() {
        let mut module = record("network");
        module
            .set_releases(vec![
                Release::new(1, "network-v1.0.0", "", "network-v1.0.0"),
                Release::new(2, "network/v1.1.0", "", "network/v1.1.0"),
            ])
            .unwrap();
        assert_eq!(module.releases()[0].id, 2);

        let err = module
            .set_releases(vec![Release::new(3, "Network release", "", "network/v2.0.0")])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_separator_tolerance() {
        let mut module = record("network");
        module
            .set_tags(vec![
                Tag::new("network/v1.0.0", "a"),
                Tag::new("network-v1.1.0", "b"),
            ])
            .unwrap();
        assert_eq!(module.latest_tag().unwrap().name, "network-v1.1.0");
        assert_eq!(module.latest_version(), Some(Version::new(1, 1, 0)));
    }

    #[test]
    fn test_initial_release() {
        let module = record("network");
        assert!(module.needs_release());
        assert_eq!(module.release_reasons(), vec![ReleaseReason::Initial]);
        assert_eq!(module.release_type(), Some(ReleaseType::Patch));
        assert_eq!(module.next_version(), Some(Version::new(1, 0, 0)));
        assert_eq!(module.next_tag().as_deref(), Some("network/v1.0.0"));
    }

    #[test]
    fn test_released_module_without_commits() {
        let mut module = record("network");
        module.set_tags(vec![Tag::new("network/v1.0.0", "a")]).unwrap();
        assert!(!module.needs_release());
        assert!(module.release_reasons().is_empty());
        assert_eq!(module.release_type(), None);
        assert_eq!(module.next_version(), None);
        assert_eq!(module.next_tag(), None);
    }

    #[test]
    fn test_direct_changes_bump_latest() {
        let mut module = record("network");
        module.set_tags(vec![Tag::new("network/v1.2.3", "a")]).unwrap();
        module.add_commit(&Commit::new("c1", "feat: add subnet input", &["network/main.tf"]));
        assert_eq!(module.release_reasons(), vec![ReleaseReason::DirectChanges]);
        assert_eq!(module.release_type(), Some(ReleaseType::Minor));
        assert_eq!(module.next_tag().as_deref(), Some("network/v1.3.0"));
    }

    #[test]
    fn test_unvoted_commits_fall_back_to_default() {
        let mut module = ModuleRecord::new(
            "network",
            "/repo/network",
            settings(|c| {
                c.commits.mode = ClassificationMode::Conventional;
                c.versioning.default_semver_level = ReleaseType::Minor;
            }),
        );
        module.set_tags(vec![Tag::new("network/v1.0.0", "a")]).unwrap();
        module.add_commit(&Commit::new("c1", "update notes", &["network/main.tf"]));
        assert_eq!(module.release_type(), Some(ReleaseType::Minor));
        assert_eq!(module.commit_analysis().skipped.len(), 1);
    }

    #[test]
    fn test_next_tag_without_prefix() {
        let mut module = ModuleRecord::new(
            "aws/vpc",
            "/repo/aws/vpc",
            settings(|c| {
                c.versioning.use_version_prefix = false;
                c.versioning.tag_separator = '-';
            }),
        );
        module.set_tags(vec![Tag::new("aws/vpc/v2.9.9", "a")]).unwrap();
        module.add_commit(&Commit::new("c1", "fix: x", &["aws/vpc/main.tf"]));
        assert_eq!(module.next_version_string().as_deref(), Some("2.9.10"));
        assert_eq!(module.next_tag().as_deref(), Some("aws-vpc-2.9.10"));
    }

    #[test]
    fn test_assign_history_filters_per_module() {
        let mut modules = vec![record("a"), record("b")];
        let tags = vec![
            Tag::new("a/v1.0.0", "1"),
            Tag::new("b/v1.0.0", "2"),
            Tag::new("a-v1.1.0", "3"),
            Tag::new("c/v1.0.0", "4"),
        ];
        let releases = vec![Release::new(1, "b/v1.0.0", "", "b/v1.0.0")];

        assign_history(&mut modules, &tags, &releases).unwrap();
        assert_eq!(modules[0].tags().len(), 2);
        assert_eq!(modules[0].tags()[0].name, "a-v1.1.0");
        assert_eq!(modules[1].tags().len(), 1);
        assert_eq!(modules[1].releases().len(), 1);
        assert!(modules[0].releases().is_empty());
    }
}
