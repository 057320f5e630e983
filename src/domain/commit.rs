use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A commit under review, limited to the files it effectively changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, files: &[&str]) -> Self {
        Commit {
            sha: sha.into(),
            message: message.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }

    /// First seven characters of the sha
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)(?:\(([^()]*)\))?(!)?: (.+)$").ok())
        .as_ref()
}

impl ParsedCommit {
    /// Parse a commit message according to the conventional commits grammar.
    ///
    /// Supports `type(scope)!: description`, `type(scope): description`,
    /// `type!: description` and `type: description`. Returns `None` when the
    /// header does not match. A commit is breaking when the header carries
    /// `!` or the body contains one of `breaking_indicators`.
    pub fn parse(message: &str, breaking_indicators: &[String]) -> Option<Self> {
        let mut lines = message.lines();
        let header = lines.next()?.trim_end();
        let captures = header_regex()?.captures(header)?;

        let r#type = captures.get(1)?.as_str().to_ascii_lowercase();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).is_some();
        let description = captures.get(4)?.as_str().trim().to_string();

        let body: Vec<&str> = lines.collect();
        let has_breaking_footer = body.iter().any(|line| {
            breaking_indicators
                .iter()
                .any(|indicator| line.contains(indicator.as_str()))
        });

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change: has_exclamation || has_breaking_footer,
        })
    }
}
