//! Pure formatting functions for UI output.
//!
//! `format_*` functions build strings and are testable; `display_*` functions
//! print them.

use crate::domain::Release;
use crate::module::ModuleRecord;
use crate::skip::SkipCondition;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format and print a warning to stderr.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// One line per discovered module: name and directory.
pub fn format_module_list(modules: &[ModuleRecord]) -> String {
    let mut sorted: Vec<&ModuleRecord> = modules.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let mut out = String::new();
    for module in sorted {
        out.push_str(&format!("  - {} ({})\n", module.name(), module.relative_path()));
    }
    out
}

pub fn display_module_list(modules: &[ModuleRecord]) {
    println!("{}", style(format!("Discovered {} modules:", modules.len())).bold());
    print!("{}", format_module_list(modules));
}

/// Release summary for one module.
///
/// Shows reasons, release type, the tag change and at most `max_commits`
/// commit subjects, followed by a count of the remainder.
pub fn format_module_plan(module: &ModuleRecord, max_commits: usize) -> String {
    let reasons: Vec<String> = module
        .release_reasons()
        .iter()
        .map(|r| r.to_string())
        .collect();
    let release_type = module
        .release_type()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".to_string());
    let next = module.next_tag().unwrap_or_else(|| "-".to_string());

    let mut out = format!(
        "{} [{}] {}\n",
        style(module.name()).bold(),
        reasons.join(", "),
        release_type
    );
    match module.latest_tag() {
        Some(latest) => out.push_str(&format!(
            "  From: {}\n  To:   {}\n",
            style(&latest.name).red(),
            style(&next).green()
        )),
        None => out.push_str(&format!("  New tag: {}\n", style(&next).green())),
    }

    let commits = module.commits();
    for commit in commits.iter().take(max_commits) {
        out.push_str(&format!("  {} {}\n", commit.short_sha(), commit.subject()));
    }
    if commits.len() > max_commits {
        out.push_str(&format!(
            "  ... and {} more commits\n",
            commits.len() - max_commits
        ));
    }
    out
}

pub fn display_module_plan(module: &ModuleRecord, max_commits: usize) {
    print!("{}", format_module_plan(module, max_commits));
}

/// Orphaned tags and releases, or nothing when both lists are empty.
pub fn format_orphans(tags: &[String], releases: &[Release]) -> String {
    let mut out = String::new();
    if !tags.is_empty() {
        out.push_str(&format!("{}\n", style("Tags without a module:").bold()));
        for tag in tags {
            out.push_str(&format!("  - {}\n", tag));
        }
    }
    if !releases.is_empty() {
        out.push_str(&format!("{}\n", style("Releases without a module:").bold()));
        for release in releases {
            out.push_str(&format!("  - {} (id {})\n", release.title, release.id));
        }
    }
    out
}

pub fn display_orphans(tags: &[String], releases: &[Release]) {
    print!("{}", format_orphans(tags, releases));
}

/// Display skip conditions, one per line, dimmed.
pub fn display_skipped(skipped: &[SkipCondition]) {
    for skip in skipped {
        eprintln!("  {}", style(skip).dim());
    }
}
