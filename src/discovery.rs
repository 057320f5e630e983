//! Module discovery via directory walking, and association of changed files
//! with the modules that contain them.

use crate::config::EngineSettings;
use crate::domain::Commit;
use crate::error::Result;
use crate::module::ModuleRecord;
use crate::skip::SkipCondition;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directories never descended into
const ALWAYS_PRUNED: &[&str] = &[".git", ".terraform"];

/// Workspace-relative, `/`-separated form of `path`
fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find every module directory under `root`.
///
/// A directory is a module when it directly contains a file matching one of
/// the definition-file globs. Directories matching a path-ignore glob are
/// pruned with their whole subtree. The workspace root itself is never a
/// module. Records are returned ordered by relative path.
pub fn discover_modules(root: &Path, settings: Arc<EngineSettings>) -> Result<Vec<ModuleRecord>> {
    let mut module_dirs = BTreeSet::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if ALWAYS_PRUNED.contains(&name.as_ref()) {
                return false;
            }
            let relative = relative_slash_path(root, e.path());
            if settings.path_ignore.is_match(&relative) {
                debug!(path = %relative, "pruning ignored directory");
                return false;
            }
            true
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !settings.definition_files.is_match(entry.file_name()) {
            continue;
        }
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let relative = relative_slash_path(root, parent);
        if relative.is_empty() {
            debug!(root = %root.display(), "workspace root holds definition files; not a module");
            continue;
        }
        module_dirs.insert(relative);
    }

    let modules: Vec<ModuleRecord> = module_dirs
        .into_iter()
        .map(|relative| {
            let directory = root.join(&relative);
            ModuleRecord::new(relative, directory, Arc::clone(&settings))
        })
        .collect();

    info!(count = modules.len(), root = %root.display(), "discovered modules");
    Ok(modules)
}

/// Outcome of associating commits with modules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationReport {
    /// Number of (commit, module) attachments made
    pub attached: usize,
    /// Files that did not count toward any module
    pub skipped: Vec<SkipCondition>,
}

/// Where a changed file lands
enum FileTarget<'a> {
    Module(usize, &'a str),
    Ignored(String),
    Outside,
}

/// Normalize a changed-file path to workspace-relative `/` form
fn normalize_file_path(file: &str) -> String {
    let unified = file.replace('\\', "/");
    let trimmed = unified.trim_start_matches("./").trim_start_matches('/');
    trimmed.to_string()
}

/// Nearest ignored ancestor directory of `file`, if any
fn ignored_ancestor(file: &str, settings: &EngineSettings) -> Option<String> {
    file.match_indices('/')
        .map(|(index, _)| &file[..index])
        .find(|dir| settings.path_ignore.is_match(dir))
        .map(str::to_string)
}

fn locate<'a>(file: &'a str, module_paths: &[(usize, &str)], settings: &EngineSettings) -> FileTarget<'a> {
    if let Some(dir) = ignored_ancestor(file, settings) {
        return FileTarget::Ignored(dir);
    }

    // module_paths is ordered longest path first, so the first hit is the
    // nearest enclosing module
    for (index, path) in module_paths {
        if let Some(rest) = file.strip_prefix(path).and_then(|r| r.strip_prefix('/')) {
            if !rest.is_empty() {
                return FileTarget::Module(*index, rest);
            }
        }
    }
    FileTarget::Outside
}

/// Attach each commit to every module it effectively touches.
///
/// File paths are workspace-relative. A file counts for the nearest enclosing
/// module unless it sits under an ignored directory or matches a
/// change-exclusion glob (relative to the module root). A commit is attached
/// to a module at most once, and only if at least one of its files counts.
pub fn associate_commits(
    modules: &mut [ModuleRecord],
    commits: &[Commit],
    settings: &EngineSettings,
) -> AssociationReport {
    let mut module_paths: Vec<(usize, String)> = modules
        .iter()
        .enumerate()
        .map(|(index, module)| (index, module.relative_path().to_string()))
        .collect();
    module_paths.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let module_paths: Vec<(usize, &str)> = module_paths
        .iter()
        .map(|(index, path)| (*index, path.as_str()))
        .collect();

    let mut report = AssociationReport::default();

    for commit in commits {
        let mut touched = BTreeSet::new();

        for raw_file in &commit.files {
            let file = normalize_file_path(raw_file);
            match locate(&file, &module_paths, settings) {
                FileTarget::Module(index, relative) => {
                    if settings.change_exclude.is_match(relative) {
                        debug!(sha = %commit.short_sha(), file = %file, module = modules[index].name(), "excluded change");
                        report.skipped.push(SkipCondition::ExcludedChange {
                            sha: commit.sha.clone(),
                            module: modules[index].name().to_string(),
                            file: file.clone(),
                        });
                    } else {
                        touched.insert(index);
                    }
                }
                FileTarget::Ignored(dir) => {
                    debug!(sha = %commit.short_sha(), file = %file, ignored = %dir, "file under ignored path");
                    report.skipped.push(SkipCondition::IgnoredPath {
                        sha: commit.sha.clone(),
                        file: file.clone(),
                        pattern_dir: dir,
                    });
                }
                FileTarget::Outside => {
                    debug!(sha = %commit.short_sha(), file = %file, "file outside every module");
                    report.skipped.push(SkipCondition::NoEnclosingModule {
                        sha: commit.sha.clone(),
                        file: file.clone(),
                    });
                }
            }
        }

        for index in touched {
            if modules[index].add_commit(commit) {
                report.attached += 1;
            }
        }
    }

    info!(
        commits = commits.len(),
        attached = report.attached,
        skipped = report.skipped.len(),
        "associated commits with modules"
    );
    report
}
