use crate::analyzer::CommitClassifier;
use crate::domain::{ReleaseType, Version, VALID_TAG_SEPARATORS};
use crate::error::{PublishError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "./gitpublish-modules.toml";

/// Configuration file looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = ".gitpublish-modules.toml";

/// Represents the complete configuration for git-publish-modules.
///
/// Contains commit classification settings, versioning rules, module discovery
/// patterns, and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub commits: CommitsConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub modules: ModulesConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// How commit messages are turned into release types.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Substring match against the major/minor/patch keyword lists
    #[default]
    Keywords,
    /// `type(scope)!: description` grammar
    Conventional,
}

/// Which conventional commit types count as recognized.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPreset {
    /// Only the configured `types` are recognized
    #[default]
    #[serde(rename = "angular")]
    Angular,
    /// Any well-formed type token is recognized
    #[serde(rename = "conventionalcommits")]
    ConventionalCommits,
}

/// Returns the default list of conventional commit types.
fn default_commit_types() -> Vec<String> {
    vec![
        "feat".to_string(),
        "fix".to_string(),
        "docs".to_string(),
        "style".to_string(),
        "refactor".to_string(),
        "test".to_string(),
        "chore".to_string(),
        "build".to_string(),
        "ci".to_string(),
        "perf".to_string(),
        "revert".to_string(),
    ]
}

/// Returns the default list of breaking change indicators.
fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE:".to_string(),
        "BREAKING-CHANGE:".to_string(),
    ]
}

/// Returns the default list of keywords that trigger major version bumps.
fn default_major_keywords() -> Vec<String> {
    vec!["major change".to_string(), "breaking change".to_string()]
}

/// Returns the default list of keywords that trigger minor version bumps.
fn default_minor_keywords() -> Vec<String> {
    vec!["feat".to_string(), "feature".to_string()]
}

/// Returns the default list of keywords that trigger patch version bumps.
fn default_patch_keywords() -> Vec<String> {
    vec!["fix".to_string(), "chore".to_string(), "docs".to_string()]
}

/// Configuration for commit classification.
///
/// Selects the classification mode and holds the keyword lists and
/// conventional commit settings each mode reads.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommitsConfig {
    #[serde(default)]
    pub mode: ClassificationMode,

    #[serde(default)]
    pub preset: CommitPreset,

    #[serde(default = "default_commit_types")]
    pub types: Vec<String>,

    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    #[serde(default = "default_major_keywords")]
    pub major_keywords: Vec<String>,

    #[serde(default = "default_minor_keywords")]
    pub minor_keywords: Vec<String>,

    #[serde(default = "default_patch_keywords")]
    pub patch_keywords: Vec<String>,
}

impl Default for CommitsConfig {
    fn default() -> Self {
        CommitsConfig {
            mode: ClassificationMode::default(),
            preset: CommitPreset::default(),
            types: default_commit_types(),
            breaking_change_indicators: default_breaking_change_indicators(),
            major_keywords: default_major_keywords(),
            minor_keywords: default_minor_keywords(),
            patch_keywords: default_patch_keywords(),
        }
    }
}

fn default_semver_level() -> ReleaseType {
    ReleaseType::Patch
}

fn default_first_version() -> String {
    "v1.0.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tag_separator() -> char {
    '/'
}

/// Configuration for version numbering and tag naming.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VersioningConfig {
    /// Release type used when commits exist but none of them voted
    #[serde(default = "default_semver_level")]
    pub default_semver_level: ReleaseType,

    /// Version given to a module's first release
    #[serde(default = "default_first_version")]
    pub default_first_version: String,

    #[serde(default = "default_true")]
    pub use_version_prefix: bool,

    /// Joins path segments in module names and the name to the version in tags
    #[serde(default = "default_tag_separator")]
    pub tag_separator: char,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            default_semver_level: default_semver_level(),
            default_first_version: default_first_version(),
            use_version_prefix: default_true(),
            tag_separator: default_tag_separator(),
        }
    }
}

fn default_definition_files() -> Vec<String> {
    vec!["*.tf".to_string(), "*.tofu".to_string()]
}

fn default_change_exclude() -> Vec<String> {
    vec![
        ".gitignore".to_string(),
        "*.md".to_string(),
        "tests/**".to_string(),
        "examples/**".to_string(),
    ]
}

/// Configuration for module discovery and change detection.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModulesConfig {
    /// File-name globs; a directory directly containing a match is a module
    #[serde(default = "default_definition_files")]
    pub definition_files: Vec<String>,

    /// Workspace-relative directory globs pruned from discovery
    #[serde(default)]
    pub path_ignore: Vec<String>,

    /// Module-relative file globs that never trigger a release
    #[serde(default = "default_change_exclude")]
    pub change_exclude: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        ModulesConfig {
            definition_files: default_definition_files(),
            path_ignore: Vec::new(),
            change_exclude: default_change_exclude(),
        }
    }
}

fn default_max_listed_commits() -> usize {
    10
}

/// Configuration for behavior customization.
///
/// Controls runtime behavior of the binary without affecting version analysis.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Allow deleting tags that no longer belong to any module
    #[serde(default)]
    pub delete_legacy_tags: bool,

    #[serde(default = "default_max_listed_commits")]
    pub max_listed_commits: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            delete_legacy_tags: false,
            max_listed_commits: default_max_listed_commits(),
        }
    }
}

impl Config {
    /// Check the configuration before any module is discovered.
    ///
    /// Rejects empty or conflicting keywords, an empty type list in
    /// conventional mode, a malformed first version, an unknown separator,
    /// patterns that fail to compile, and a zero commit limit.
    ///
    /// # Returns
    /// * `Ok(())` - Configuration is usable
    /// * `Err(PublishError::Config)` - Describes the first offending field
    pub fn validate(&self) -> Result<()> {
        self.validate_keywords()?;

        if self.commits.mode == ClassificationMode::Conventional {
            if self.commits.types.is_empty() && self.commits.preset == CommitPreset::Angular {
                return Err(PublishError::config(
                    "commits.types must not be empty in conventional mode",
                ));
            }
            if self.commits.types.iter().any(|t| t.trim().is_empty()) {
                return Err(PublishError::config("commits.types contains an empty type"));
            }
        }

        parse_first_version(&self.versioning.default_first_version)?;

        if !VALID_TAG_SEPARATORS.contains(&self.versioning.tag_separator) {
            return Err(PublishError::config(format!(
                "versioning.tag_separator '{}' must be one of {:?}",
                self.versioning.tag_separator, VALID_TAG_SEPARATORS
            )));
        }

        if self.modules.definition_files.is_empty() {
            return Err(PublishError::config(
                "modules.definition_files must name at least one pattern",
            ));
        }

        if self.behavior.max_listed_commits == 0 {
            return Err(PublishError::config(
                "behavior.max_listed_commits must be greater than zero",
            ));
        }

        self.modules.compile()?;

        Ok(())
    }

    fn validate_keywords(&self) -> Result<()> {
        let lists = [
            ("major_keywords", &self.commits.major_keywords),
            ("minor_keywords", &self.commits.minor_keywords),
            ("patch_keywords", &self.commits.patch_keywords),
        ];

        let mut seen: HashMap<String, &str> = HashMap::new();
        for (list_name, keywords) in lists {
            for keyword in keywords {
                let normalized = keyword.trim().to_lowercase();
                if normalized.is_empty() {
                    return Err(PublishError::config(format!(
                        "commits.{} contains an empty keyword",
                        list_name
                    )));
                }
                if let Some(other) = seen.insert(normalized, list_name) {
                    if other != list_name {
                        return Err(PublishError::config(format!(
                            "keyword '{}' appears in both commits.{} and commits.{}",
                            keyword.trim(),
                            other,
                            list_name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse `default_first_version`, allowing only `v?X.Y.Z`.
fn parse_first_version(raw: &str) -> Result<Version> {
    let bare = raw.strip_prefix('v').unwrap_or(raw);
    let parsed = semver::Version::parse(bare).map_err(|e| {
        PublishError::config(format!(
            "versioning.default_first_version '{}' is not a valid version: {}",
            raw, e
        ))
    })?;

    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(PublishError::config(format!(
            "versioning.default_first_version '{}' must not carry pre-release or build metadata",
            raw
        )));
    }

    Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
}

fn add_glob(builder: &mut GlobSetBuilder, field: &str, pattern: &str) -> Result<()> {
    let glob = Glob::new(pattern).map_err(|e| {
        PublishError::config(format!("{} has invalid pattern '{}': {}", field, pattern, e))
    })?;
    builder.add(glob);
    Ok(())
}

fn build_globset(field: &str, patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        add_glob(&mut builder, field, pattern)?;
    }
    Ok(builder.build()?)
}

/// Like [`build_globset`], but `dir/**` also matches `dir` itself so the
/// directory is pruned along with its contents.
fn build_subtree_globset(field: &str, patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        add_glob(&mut builder, field, pattern)?;
        if let Some(dir) = pattern.strip_suffix("/**") {
            if !dir.is_empty() {
                add_glob(&mut builder, field, dir)?;
            }
        }
    }
    Ok(builder.build()?)
}

/// Compiled `[modules]` patterns
struct ModuleGlobs {
    definition_files: GlobSet,
    path_ignore: GlobSet,
    change_exclude: GlobSet,
}

impl ModulesConfig {
    fn compile(&self) -> Result<ModuleGlobs> {
        Ok(ModuleGlobs {
            definition_files: build_globset("modules.definition_files", &self.definition_files)?,
            path_ignore: build_subtree_globset("modules.path_ignore", &self.path_ignore)?,
            change_exclude: build_globset("modules.change_exclude", &self.change_exclude)?,
        })
    }
}

/// Validated, compiled settings handed to discovery, mapping, and the
/// module records.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub classifier: CommitClassifier,
    pub default_release_type: ReleaseType,
    pub default_first_version: Version,
    pub use_version_prefix: bool,
    pub tag_separator: char,
    pub definition_files: GlobSet,
    pub path_ignore: GlobSet,
    pub change_exclude: GlobSet,
    pub max_listed_commits: usize,
}

impl EngineSettings {
    /// Validate `config` and compile its patterns.
    ///
    /// # Arguments
    /// * `config` - Loaded configuration
    ///
    /// # Returns
    /// * `Ok(EngineSettings)` - Settings shared by discovery, association and
    ///   every module record
    /// * `Err` - If [`Config::validate`] fails
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let globs = config.modules.compile()?;

        Ok(EngineSettings {
            classifier: CommitClassifier::new(&config.commits),
            default_release_type: config.versioning.default_semver_level,
            default_first_version: parse_first_version(&config.versioning.default_first_version)?,
            use_version_prefix: config.versioning.use_version_prefix,
            tag_separator: config.versioning.tag_separator,
            definition_files: globs.definition_files,
            path_ignore: globs.path_ignore,
            change_exclude: globs.change_exclude,
            max_listed_commits: config.behavior.max_listed_commits,
        })
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitpublish-modules.toml` in current directory
/// 3. `.gitpublish-modules.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
