use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_publish_modules::cli::{prune_orphaned_tags, run_plan_workflow, PlanWorkflowArgs, PruneOutcome};
use git_publish_modules::config::{self, Config, EngineSettings};
use git_publish_modules::discovery::discover_modules;
use git_publish_modules::git::Git2Repository;
use git_publish_modules::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-publish-modules",
    about = "Plan semantic version releases for every module in a repository"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, default_value = ".", help = "Workspace root to scan for modules")]
    root: PathBuf,

    #[arg(long, help = "Only consider commits after this revision (default: each module's latest tag)")]
    since: Option<String>,

    #[arg(long, help = "TOML file listing historical releases")]
    releases: Option<PathBuf>,

    #[arg(long, help = "Delete tags that belong to no module")]
    prune: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(long, help = "Show debug output")]
    verbose: bool,

    #[arg(long, help = "Show discovered modules and exit")]
    list: bool,

    #[arg(short = 'V', long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("git-publish-modules {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    if args.list {
        return list_modules(&args.root, &config);
    }

    let git_repo = match Git2Repository::open(&args.root) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };
    let workspace_prefix = workspace_prefix(&git_repo.workdir()?, &args.root)?;

    let workflow_args = PlanWorkflowArgs {
        root: args.root.clone(),
        workspace_prefix,
        since: args.since.clone(),
        releases_file: args.releases.clone(),
    };

    let plan = match run_plan_workflow(&workflow_args, &config, &git_repo) {
        Ok(plan) => plan,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if args.verbose {
        ui::display_skipped(&plan.association.skipped);
    }

    let pending = plan.modules_to_release();
    if pending.is_empty() {
        ui::display_success(&format!(
            "All {} modules are up to date",
            plan.modules.len()
        ));
    } else {
        ui::display_status(&format!(
            "{} of {} modules need a release:\n",
            pending.len(),
            plan.modules.len()
        ));
        for module in pending {
            ui::display_module_plan(module, config.behavior.max_listed_commits);
        }
    }

    ui::display_orphans(&plan.orphaned_tags, &plan.orphaned_releases);

    if !args.prune || plan.orphaned_tags.is_empty() {
        return Ok(());
    }

    if !config.behavior.delete_legacy_tags {
        ui::display_warning(
            "Pruning is disabled; set behavior.delete_legacy_tags = true to delete orphaned tags",
        );
        return Ok(());
    }

    if !args.force
        && !ui::confirm_action(&format!(
            "Delete {} orphaned tags?",
            plan.orphaned_tags.len()
        ))?
    {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    match prune_orphaned_tags(&plan, &config, &git_repo)? {
        PruneOutcome::Deleted(deleted) => {
            for tag in &deleted {
                ui::display_success(&format!("Deleted tag: {}", tag));
            }
        }
        PruneOutcome::Disabled => {}
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_modules(root: &Path, config: &Config) -> Result<()> {
    let settings = Arc::new(EngineSettings::from_config(config)?);
    let modules = discover_modules(root, settings)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    if modules.is_empty() {
        ui::display_warning(&format!("No modules found under {}", root.display()));
        return Ok(());
    }

    ui::display_module_list(&modules);
    Ok(())
}

/// Path of `root` relative to the repository working tree, `/`-separated
fn workspace_prefix(workdir: &Path, root: &Path) -> Result<String> {
    let workdir = fs::canonicalize(workdir)
        .with_context(|| format!("Failed to resolve {}", workdir.display()))?;
    let root =
        fs::canonicalize(root).with_context(|| format!("Failed to resolve {}", root.display()))?;

    let relative = root.strip_prefix(&workdir).with_context(|| {
        format!(
            "{} is outside the repository at {}",
            root.display(),
            workdir.display()
        )
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
