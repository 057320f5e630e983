use crate::domain::version::Version;
use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};

/// Characters that have, at some point, joined a module name to its version
/// in tag and release names.
pub const VALID_TAG_SEPARATORS: [char; 4] = ['-', '_', '/', '.'];

/// Marker every separator collapses to before names are compared.
const CANONICAL_SEPARATOR: char = '|';

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub commit_sha: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            commit_sha: commit_sha.into(),
        }
    }
}

/// Represents a release published on the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub tag_name: String,
}

impl Release {
    /// Create a new release
    pub fn new(
        id: u64,
        title: impl Into<String>,
        body: impl Into<String>,
        tag_name: impl Into<String>,
    ) -> Self {
        Release {
            id,
            title: title.into(),
            body: body.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// Historical record whose name carries `{module}{separator}{version}`.
///
/// Tags are matched by tag name, releases by title.
pub trait VersionedName {
    fn versioned_name(&self) -> &str;
}

impl VersionedName for Tag {
    fn versioned_name(&self) -> &str {
        &self.name
    }
}

impl VersionedName for Release {
    fn versioned_name(&self) -> &str {
        &self.title
    }
}

pub fn is_valid_separator(c: char) -> bool {
    VALID_TAG_SEPARATORS.contains(&c)
}

/// Replace every valid separator with one canonical marker.
pub fn canonicalize_separators(name: &str) -> String {
    name.chars()
        .map(|c| {
            if is_valid_separator(c) {
                CANONICAL_SEPARATOR
            } else {
                c
            }
        })
        .collect()
}

/// Split `name` into its module part and trailing version.
///
/// Accepts `{module}{sep}[v]X.Y.Z` where `sep` is any valid separator and the
/// module part is non-empty. Scans from the end, so input size bounds the work.
pub fn split_versioned_name(name: &str) -> Option<(&str, Version)> {
    let bytes = name.as_bytes();

    let patch_start = digit_run_start(bytes, bytes.len())?;
    let minor_end = dot_before(bytes, patch_start)?;
    let minor_start = digit_run_start(bytes, minor_end)?;
    let major_end = dot_before(bytes, minor_start)?;
    let major_start = digit_run_start(bytes, major_end)?;

    let mut cursor = major_start;
    if cursor > 0 && bytes[cursor - 1] == b'v' {
        cursor -= 1;
    }
    if cursor < 2 || !is_valid_separator(bytes[cursor - 1] as char) {
        return None;
    }

    let module = &name[..cursor - 1];
    let version = Version::new(
        name[major_start..major_end].parse().ok()?,
        name[minor_start..minor_end].parse().ok()?,
        name[patch_start..].parse().ok()?,
    );
    Some((module, version))
}

fn digit_run_start(bytes: &[u8], end: usize) -> Option<usize> {
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    (start < end).then_some(start)
}

fn dot_before(bytes: &[u8], index: usize) -> Option<usize> {
    (index > 0 && bytes[index - 1] == b'.').then(|| index - 1)
}

/// Whether a tag or release name belongs to `module_name`, regardless of
/// which separator convention either side uses.
pub fn is_associated(module_name: &str, versioned_name: &str) -> bool {
    match split_versioned_name(versioned_name) {
        Some((module_part, _)) => {
            canonicalize_separators(module_part) == canonicalize_separators(module_name)
        }
        None => false,
    }
}

/// Extract the version embedded in a tag or release name for `module_name`.
///
/// Any deviation from `{module}{sep}[v]X.Y.Z` is a validation error.
pub fn extract_version(versioned_name: &str, module_name: &str) -> Result<Version> {
    let (module_part, version) = split_versioned_name(versioned_name).ok_or_else(|| {
        PublishError::validation(format!(
            "'{}' does not match '{{module}}{{separator}}[v]X.Y.Z' (separators: {:?})",
            versioned_name, VALID_TAG_SEPARATORS
        ))
    })?;

    if canonicalize_separators(module_part) != canonicalize_separators(module_name) {
        return Err(PublishError::validation(format!(
            "'{}' is not associated with module '{}'",
            versioned_name, module_name
        )));
    }

    Ok(version)
}
