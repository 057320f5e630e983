use crate::domain::{Release, Tag};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Historical tags and releases supplied from a file, for history that local
/// git cannot provide (releases live on the hosting service).
///
/// ```toml
/// [[releases]]
/// id = 12
/// title = "network/v1.0.0"
/// tag_name = "network/v1.0.0"
/// body = "Initial release"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHistory {
    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub releases: Vec<Release>,
}

impl ReleaseHistory {
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Read a release history file
pub fn load_release_history(path: &Path) -> Result<ReleaseHistory> {
    let contents = fs::read_to_string(path)?;
    ReleaseHistory::parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_releases_and_tags() {
        let history = ReleaseHistory::parse(
            r#"
[[tags]]
name = "network/v1.0.0"
commit_sha = "abc"

[[releases]]
id = 1
title = "network/v1.0.0"
tag_name = "network/v1.0.0"

[[releases]]
id = 2
title = "storage-v0.1.0"
tag_name = "storage-v0.1.0"
body = "first"
"#,
        )
        .unwrap();

        assert_eq!(history.tags, vec![Tag::new("network/v1.0.0", "abc")]);
        assert_eq!(history.releases.len(), 2);
        assert_eq!(history.releases[0].body, "");
        assert_eq!(history.releases[1].body, "first");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ReleaseHistory::parse("").unwrap(), ReleaseHistory::default());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = ReleaseHistory::parse("[[releases]]\nid = 1\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
