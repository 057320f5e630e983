//! Detection of tags and releases that no longer belong to any module.

use crate::domain::{is_associated, Release, Tag, VersionedName};
use crate::module::ModuleRecord;
use tracing::warn;

fn is_orphaned<T: VersionedName>(entry: &T, modules: &[ModuleRecord]) -> bool {
    !modules
        .iter()
        .any(|module| is_associated(module.name(), entry.versioned_name()))
}

/// Names of tags not associated with any current module, sorted.
pub fn tags_to_delete(all_tags: &[Tag], modules: &[ModuleRecord]) -> Vec<String> {
    let mut orphaned: Vec<String> = all_tags
        .iter()
        .filter(|tag| is_orphaned(*tag, modules))
        .map(|tag| tag.name.clone())
        .collect();
    orphaned.sort();
    orphaned.dedup();

    if !orphaned.is_empty() {
        warn!(count = orphaned.len(), "tags no longer match any module");
    }
    orphaned
}

/// Releases not associated with any current module, sorted by title.
pub fn releases_to_delete(all_releases: &[Release], modules: &[ModuleRecord]) -> Vec<Release> {
    let mut orphaned: Vec<Release> = all_releases
        .iter()
        .filter(|release| is_orphaned(*release, modules))
        .cloned()
        .collect();
    orphaned.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

    if !orphaned.is_empty() {
        warn!(count = orphaned.len(), "releases no longer match any module");
    }
    orphaned
}
