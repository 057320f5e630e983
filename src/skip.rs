use std::fmt;

/// Conditions that leave a file or commit out of release planning.
/// These are non-fatal: processing continues and they are reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipCondition {
    /// Changed file is not inside any discovered module
    NoEnclosingModule { sha: String, file: String },
    /// Changed file sits under a path excluded from discovery
    IgnoredPath {
        sha: String,
        file: String,
        pattern_dir: String,
    },
    /// Changed file matches a change-exclusion pattern of its module
    ExcludedChange {
        sha: String,
        module: String,
        file: String,
    },
    /// Commit message produced no release-type vote
    UnclassifiedMessage { sha: String, subject: String },
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

impl fmt::Display for SkipCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCondition::NoEnclosingModule { sha, file } => {
                write!(f, "{}: '{}' is not inside any module", short(sha), file)
            }
            SkipCondition::IgnoredPath {
                sha,
                file,
                pattern_dir,
            } => write!(
                f,
                "{}: '{}' is under ignored path '{}'",
                short(sha),
                file,
                pattern_dir
            ),
            SkipCondition::ExcludedChange { sha, module, file } => write!(
                f,
                "{}: '{}' in module '{}' matches a change exclusion",
                short(sha),
                file,
                module
            ),
            SkipCondition::UnclassifiedMessage { sha, subject } => write!(
                f,
                "{}: message '{}' matched no classification rule",
                short(sha),
                subject
            ),
        }
    }
}
