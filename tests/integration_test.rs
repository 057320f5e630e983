// tests/integration_test.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use git_publish_modules::config::{ClassificationMode, Config, EngineSettings};
use git_publish_modules::domain::{next_version, Commit, Release, ReleaseType, Tag, Version};
use git_publish_modules::git::{Git2Repository, Repository};
use git_publish_modules::orphans::tags_to_delete;
use git_publish_modules::{ModuleRecord, ReleasePlan, ReleaseReason};
use tempfile::TempDir;

fn settings(config: &Config) -> Arc<EngineSettings> {
    Arc::new(EngineSettings::from_config(config).unwrap())
}

fn write_module(root: &Path, rel: &str) {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("main.tf"), "").unwrap();
}

fn conventional() -> Arc<EngineSettings> {
    let mut config = Config::default();
    config.commits.mode = ClassificationMode::Conventional;
    settings(&config)
}

#[test]
fn test_separator_tolerance() {
    let mut module = ModuleRecord::new("network", "/repo/network", settings(&Config::default()));
    module
        .set_tags(vec![
            Tag::new("network/v1.0.0", "a"),
            Tag::new("network-v1.1.0", "b"),
        ])
        .unwrap();

    assert_eq!(module.latest_tag().unwrap().name, "network-v1.1.0");
    assert_eq!(module.latest_version(), Some(Version::new(1, 1, 0)));
}

#[test]
fn test_foreign_tag_is_validation_error() {
    let mut module = ModuleRecord::new("network", "/repo/network", settings(&Config::default()));
    let err = module
        .set_tags(vec![Tag::new("storage/v1.0.0", "a")])
        .unwrap_err();
    assert!(err.is_validation());
    assert!(module.tags().is_empty());
}

#[test]
fn test_excluded_change_does_not_trigger_release() {
    let tmp = TempDir::new().unwrap();
    write_module(tmp.path(), "module");

    let commits = vec![Commit::new("c1", "fix: typo", &["module/README.md"])];
    let tags = vec![Tag::new("module/v1.0.0", "c0")];
    let plan = ReleasePlan::build(
        tmp.path(),
        settings(&Config::default()),
        &commits,
        &tags,
        &[],
    )
    .unwrap();

    let module = plan.module("module").unwrap();
    assert!(module.commits().is_empty());
    assert!(!module.needs_release());
    assert_eq!(module.release_type(), None);
    assert_eq!(module.next_tag(), None);
    assert_eq!(plan.association.skipped.len(), 1);
}

#[test]
fn test_orphan_detection() {
    let config = settings(&Config::default());
    let modules = vec![
        ModuleRecord::new("a", "/repo/a", Arc::clone(&config)),
        ModuleRecord::new("b", "/repo/b", Arc::clone(&config)),
    ];
    let tags = vec![
        Tag::new("a/v1.0.0", "1"),
        Tag::new("b/v1.0.0", "2"),
        Tag::new("c/v1.0.0", "3"),
    ];
    assert_eq!(tags_to_delete(&tags, &modules), vec!["c/v1.0.0"]);
}

#[test]
fn test_conventional_parsing() {
    let settings = conventional();
    let classifier = &settings.classifier;
    assert_eq!(
        classifier.classify("fix!: patch security hole"),
        Some(ReleaseType::Major)
    );
    assert_eq!(classifier.classify("chore: tidy"), Some(ReleaseType::Patch));
    assert_eq!(classifier.classify("update notes"), None);
}

#[test]
fn test_version_examples() {
    let v = Version::parse("v1.2.3").unwrap();
    assert_eq!(
        next_version(Some(v), ReleaseType::Minor, Version::new(1, 0, 0)).render(true),
        "v1.3.0"
    );
    let v = Version::parse("2.9.9").unwrap();
    assert_eq!(
        next_version(Some(v), ReleaseType::Patch, Version::new(1, 0, 0)).render(false),
        "2.9.10"
    );
    let first = Version::parse("v0.1.0").unwrap();
    for release_type in [ReleaseType::Patch, ReleaseType::Minor, ReleaseType::Major] {
        assert_eq!(next_version(None, release_type, first).render(true), "v0.1.0");
    }
}

#[test]
fn test_workspace_plan_end_to_end() {
    let tmp = TempDir::new().unwrap();
    write_module(tmp.path(), "modules/network");
    write_module(tmp.path(), "modules/network/subnet");
    write_module(tmp.path(), "modules/storage");
    write_module(tmp.path(), "modules/legacy");

    let commits = vec![
        Commit::new("c1", "feat: add subnet outputs", &["modules/network/subnet/outputs.tf"]),
        Commit::new("c2", "fix: network timeout", &["modules/network/main.tf"]),
        Commit::new(
            "c3",
            "refactor!: rename bucket\n\nBREAKING CHANGE: bucket renamed",
            &["modules/storage/main.tf", "modules/storage/README.md"],
        ),
        Commit::new("c4", "chore: root tooling", &["Makefile"]),
    ];
    let tags = vec![
        Tag::new("modules/network/v1.2.0", "t1"),
        Tag::new("modules-network-v1.3.0", "t2"),
        Tag::new("modules/network/subnet/v0.4.1", "t3"),
        Tag::new("modules/storage/v2.0.0", "t4"),
        Tag::new("modules/legacy/v1.0.0", "t5"),
        Tag::new("modules/removed/v3.0.0", "t6"),
    ];
    let releases = vec![
        Release::new(1, "modules/storage/v2.0.0", "", "modules/storage/v2.0.0"),
        Release::new(2, "modules/removed/v3.0.0", "", "modules/removed/v3.0.0"),
    ];

    let plan = ReleasePlan::build(tmp.path(), conventional(), &commits, &tags, &releases).unwrap();

    let names: Vec<&str> = plan.modules_to_release().iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec!["modules/network", "modules/network/subnet", "modules/storage"]
    );

    let network = plan.module("modules/network").unwrap();
    assert_eq!(network.commits().len(), 1);
    assert_eq!(network.release_reasons(), vec![ReleaseReason::DirectChanges]);
    assert_eq!(network.next_tag().as_deref(), Some("modules/network/v1.3.1"));

    let subnet = plan.module("modules/network/subnet").unwrap();
    assert_eq!(subnet.next_tag().as_deref(), Some("modules/network/subnet/v0.5.0"));

    let storage = plan.module("modules/storage").unwrap();
    assert_eq!(storage.release_type(), Some(ReleaseType::Major));
    assert_eq!(storage.next_tag().as_deref(), Some("modules/storage/v3.0.0"));
    assert_eq!(storage.releases().len(), 1);

    assert!(!plan.module("modules/legacy").unwrap().needs_release());
    assert_eq!(plan.orphaned_tags, vec!["modules/removed/v3.0.0"]);
    assert_eq!(plan.orphaned_releases.len(), 1);
    assert_eq!(plan.orphaned_releases[0].id, 2);
}

#[test]
fn test_association_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    write_module(tmp.path(), "a");
    write_module(tmp.path(), "b");
    let commits = vec![
        Commit::new("c1", "feat: x", &["a/main.tf", "b/vars.tf"]),
        Commit::new("c2", "fix: y", &["b/main.tf"]),
    ];
    let settings = settings(&Config::default());

    let first = ReleasePlan::build(tmp.path(), Arc::clone(&settings), &commits, &[], &[]).unwrap();
    let second = ReleasePlan::build(tmp.path(), settings, &commits, &[], &[]).unwrap();

    for (x, y) in first.modules.iter().zip(second.modules.iter()) {
        assert_eq!(x.name(), y.name());
        assert_eq!(x.commits(), y.commits());
        assert_eq!(x.next_tag(), y.next_tag());
    }
}

#[test]
fn test_git2_history_feeds_plan() {
    let tmp = TempDir::new().unwrap();
    let repo = git2::Repository::init(tmp.path()).unwrap();
    let signature = git2::Signature::now("Test", "test@example.com").unwrap();

    let commit_file = |path: &str, message: &str| {
        let full = tmp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, message).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    };

    let first = commit_file("network/main.tf", "feat: network");
    let target = repo.find_object(first, None).unwrap();
    repo.tag_lightweight("network/v1.0.0", &target, false).unwrap();
    commit_file("network/variables.tf", "fix: variable default");

    let git = Git2Repository::from_git2(git2::Repository::open(tmp.path()).unwrap());
    let commits = git.list_commits(Some("network/v1.0.0")).unwrap();
    let tags = git.list_tags().unwrap();

    let plan = ReleasePlan::build(
        tmp.path(),
        settings(&Config::default()),
        &commits,
        &tags,
        &[],
    )
    .unwrap();
    let network = plan.module("network").unwrap();
    assert_eq!(network.commits().len(), 1);
    assert_eq!(network.next_tag().as_deref(), Some("network/v1.0.1"));
}
