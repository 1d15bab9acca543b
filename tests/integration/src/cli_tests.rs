//! Black-box tests of the kitsync binary.

use std::path::PathBuf;
use std::sync::OnceLock;

use assert_cmd::Command;
use kit_test_utils::TestTree;
use predicates::prelude::*;

/// Compile the binary on first use so the suite does not depend on a prior
/// build of the CLI package having populated the target directory.
fn kitsync_bin() -> &'static PathBuf {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        escargot::CargoBuild::new()
            .package("kit-cli")
            .bin("kitsync")
            .run()
            .unwrap()
            .path()
            .to_path_buf()
    })
}

fn kitsync() -> Command {
    Command::new(kitsync_bin())
}

/// `--project` installs into `<cwd>/.claude`, so run the binary from the
/// target side of the fixture.
fn run_sync(tree: &TestTree, extra: &[&str]) -> assert_cmd::assert::Assert {
    let cwd = tree.target_root().parent().unwrap().to_path_buf();
    let mut cmd = kitsync();
    cmd.current_dir(&cwd)
        .arg("sync")
        .arg("--project")
        .arg("--source")
        .arg(tree.source_root());
    for arg in extra {
        cmd.arg(arg);
    }
    cmd.assert()
}

#[test]
fn fresh_project_install_succeeds() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    tree.source_file("skills/s/f.md", "Y");
    let cwd = tree.target_root().parent().unwrap().to_path_buf();

    run_sync(&tree, &[])
        .success()
        .stdout(predicate::str::contains("2 installed"));

    let installed = cwd.join(".claude");
    assert!(installed.join("commands/a.md").is_file());
    assert!(installed.join(".kitsync-manifest.json").is_file());
}

#[test]
fn second_sync_reports_up_to_date() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");

    run_sync(&tree, &[]).success();
    run_sync(&tree, &[])
        .success()
        .stdout(predicate::str::contains("0 installed, 1 up to date"));
}

#[test]
fn piped_stdin_never_blocks_on_conflicts() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    run_sync(&tree, &[]).success();

    // Local edit; with no terminal attached the run must not hang.
    let edited = tree
        .target_root()
        .parent()
        .unwrap()
        .join(".claude/commands/a.md");
    std::fs::write(&edited, "Z").unwrap();

    run_sync(&tree, &[])
        .success()
        .stdout(predicate::str::contains("1 conflict(s) (0 kept)"));
    assert_eq!(std::fs::read_to_string(&edited).unwrap(), "X");
}

#[test]
fn dry_run_writes_nothing() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    let cwd = tree.target_root().parent().unwrap().to_path_buf();

    run_sync(&tree, &["--dry-run"]).success();
    assert!(!cwd.join(".claude/commands/a.md").exists());
    assert!(!cwd.join(".claude/.kitsync-manifest.json").exists());
}

#[test]
fn status_reports_in_sync_after_install() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    run_sync(&tree, &[]).success();

    let cwd = tree.target_root().parent().unwrap().to_path_buf();
    kitsync()
        .current_dir(&cwd)
        .arg("status")
        .arg("--project")
        .arg("--source")
        .arg(tree.source_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("in sync"));
}

#[test]
fn user_and_project_scopes_are_mutually_exclusive() {
    kitsync()
        .arg("sync")
        .arg("--user")
        .arg("--project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
