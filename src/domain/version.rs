use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Semantic version representation
///
/// Field order matters: the derived `Ord` compares major, then minor, then
/// patch, numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse `X.Y.Z` with an optional leading `v` (e.g. "v1.2.3" -> Version(1,2,3))
    pub fn parse(input: &str) -> Result<Self> {
        let clean = input.strip_prefix('v').unwrap_or(input);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() != 3 {
            return Err(PublishError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                input
            )));
        }

        let major = parse_component(parts[0], "major", input)?;
        let minor = parse_component(parts[1], "minor", input)?;
        let patch = parse_component(parts[2], "patch", input)?;

        Ok(Version::new(major, minor, patch))
    }

    /// Bump version according to release type
    pub fn bump(&self, release_type: ReleaseType) -> Self {
        match release_type {
            ReleaseType::Major => Version::new(self.major + 1, 0, 0),
            ReleaseType::Minor => Version::new(self.major, self.minor + 1, 0),
            ReleaseType::Patch => Version::new(self.major, self.minor, self.patch + 1),
        }
    }

    /// Render with or without the `v` prefix
    pub fn render(&self, use_prefix: bool) -> String {
        if use_prefix {
            format!("v{}", self)
        } else {
            self.to_string()
        }
    }
}

fn parse_component(part: &str, label: &str, input: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PublishError::version(format!(
            "Invalid {} version '{}' in '{}'",
            label, part, input
        )));
    }
    part.parse::<u64>().map_err(|_| {
        PublishError::version(format!(
            "{} version '{}' in '{}' is out of range",
            label, part, input
        ))
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The semantic-version component a release increments.
///
/// Ordered by severity: `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
        };
        f.write_str(label)
    }
}

/// Next version after `base`, or `default_first` when the module has never
/// been released.
pub fn next_version(
    base: Option<Version>,
    release_type: ReleaseType,
    default_first: Version,
) -> Version {
    match base {
        Some(version) => version.bump(release_type),
        None => default_first,
    }
}

/// Numeric comparison of major, then minor, then patch.
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}
