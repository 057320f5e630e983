use crate::config::{ClassificationMode, CommitPreset, CommitsConfig};
use crate::domain::{Commit, ParsedCommit, ReleaseType};
use crate::skip::SkipCondition;
use tracing::debug;

/// Aggregated outcome of classifying a set of commits
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitAnalysis {
    /// Highest vote across all commits, `None` when nothing voted
    pub release_type: Option<ReleaseType>,
    /// Commits whose message produced no vote
    pub skipped: Vec<SkipCondition>,
}

/// Classifies commit messages into release types.
///
/// The mode is fixed for the lifetime of the classifier; every commit in a run
/// goes through the same rules.
#[derive(Debug, Clone)]
pub struct CommitClassifier {
    mode: ClassificationMode,
    preset: CommitPreset,
    types: Vec<String>,
    breaking_indicators: Vec<String>,
    major_keywords: Vec<String>,
    minor_keywords: Vec<String>,
    patch_keywords: Vec<String>,
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

impl CommitClassifier {
    /// Create a classifier from validated commit settings
    pub fn new(config: &CommitsConfig) -> Self {
        CommitClassifier {
            mode: config.mode,
            preset: config.preset,
            types: lowercase_all(&config.types),
            breaking_indicators: config.breaking_change_indicators.clone(),
            major_keywords: lowercase_all(&config.major_keywords),
            minor_keywords: lowercase_all(&config.minor_keywords),
            patch_keywords: lowercase_all(&config.patch_keywords),
        }
    }

    /// Classification mode used for every commit in the run
    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    /// Classify a single commit message, `None` meaning no vote
    pub fn classify(&self, message: &str) -> Option<ReleaseType> {
        match self.mode {
            ClassificationMode::Keywords => self.classify_keywords(message),
            ClassificationMode::Conventional => self.classify_conventional(message),
        }
    }

    fn classify_keywords(&self, message: &str) -> Option<ReleaseType> {
        let lowered = message.to_lowercase();
        let lists = [
            (ReleaseType::Major, &self.major_keywords),
            (ReleaseType::Minor, &self.minor_keywords),
            (ReleaseType::Patch, &self.patch_keywords),
        ];

        lists
            .into_iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(release_type, _)| release_type)
    }

    fn classify_conventional(&self, message: &str) -> Option<ReleaseType> {
        let parsed = ParsedCommit::parse(message, &self.breaking_indicators)?;

        if parsed.is_breaking_change {
            return Some(ReleaseType::Major);
        }

        match parsed.r#type.as_str() {
            "feat" => Some(ReleaseType::Minor),
            "fix" | "perf" => Some(ReleaseType::Patch),
            other if self.is_recognized_type(other) => Some(ReleaseType::Patch),
            _ => None,
        }
    }

    fn is_recognized_type(&self, commit_type: &str) -> bool {
        match self.preset {
            CommitPreset::Angular => self.types.iter().any(|t| t == commit_type),
            CommitPreset::ConventionalCommits => true,
        }
    }

    /// Fold votes with priority major > minor > patch; messages without a vote
    /// are skipped.
    pub fn aggregate<'a, I>(&self, messages: I) -> Option<ReleaseType>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut highest: Option<ReleaseType> = None;
        for message in messages {
            if let Some(vote) = self.classify(message) {
                highest = highest.max(Some(vote));
                if highest == Some(ReleaseType::Major) {
                    break;
                }
            }
        }
        highest
    }

    /// Classify commits, recording the ones that produced no vote
    pub fn analyze<'a, I>(&self, commits: I) -> CommitAnalysis
    where
        I: IntoIterator<Item = &'a Commit>,
    {
        let mut analysis = CommitAnalysis::default();
        for commit in commits {
            match self.classify(&commit.message) {
                Some(vote) => {
                    analysis.release_type = analysis.release_type.max(Some(vote));
                }
                None => {
                    debug!(sha = %commit.short_sha(), subject = %commit.subject(), "commit message has no release vote");
                    analysis.skipped.push(SkipCondition::UnclassifiedMessage {
                        sha: commit.sha.clone(),
                        subject: commit.subject().to_string(),
                    });
                }
            }
        }
        analysis
    }
}
