//! End-to-end sync scenarios through the public engine API.

use std::fs;

use kit_core::{ConflictPrompt, Decision, Mode, SyncEngine, SyncOptions};
use kit_fs::digest_bytes;
use kit_test_utils::TestTree;

/// Prompt that replays a fixed script of answers.
struct Script {
    answers: Vec<Decision>,
    asked: usize,
}

impl Script {
    fn of(answers: &[Decision]) -> Self {
        Self {
            answers: answers.to_vec(),
            asked: 0,
        }
    }

    fn silent() -> Self {
        Self::of(&[])
    }
}

impl ConflictPrompt for Script {
    fn is_interactive(&self) -> bool {
        !self.answers.is_empty()
    }

    fn ask(&mut self, _rel_path: &str) -> Decision {
        let d = self.answers[self.asked];
        self.asked += 1;
        d
    }
}

fn engine(tree: &TestTree, mode: Mode) -> SyncEngine {
    SyncEngine::new(tree.source_root(), tree.target_root(), mode, SyncOptions::default())
}

fn forced(tree: &TestTree, mode: Mode) -> SyncEngine {
    SyncEngine::new(
        tree.source_root(),
        tree.target_root(),
        mode,
        SyncOptions {
            force: true,
            dry_run: false,
        },
    )
}

/// The full scenario from start to finish: fresh install, local edit,
/// conflict, keep, new baseline.
#[test]
fn edit_keep_rebaseline_scenario() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    tree.source_file("skills/s/f.md", "Y");
    let eng = engine(&tree, Mode::Copy);

    // Fresh copy install writes both and records a two-entry manifest.
    let report = eng.sync(&mut Script::silent()).unwrap();
    assert!(report.fresh_install);
    assert_eq!(report.installed, 2);
    let manifest = tree.manifest_json();
    assert_eq!(manifest["mode"], "copy");
    assert_eq!(manifest["files"].as_object().unwrap().len(), 2);

    // User edits a.md on disk; source unchanged.
    tree.target_file("commands/a.md", "Z");

    // Re-run reports exactly one conflict; keep leaves Z in place.
    let mut prompt = Script::of(&[Decision::Keep]);
    let report = eng.sync(&mut prompt).unwrap();
    assert_eq!(report.conflicts, 1);
    assert_eq!(report.kept, 1);
    assert_eq!(prompt.asked, 1);
    assert_eq!(tree.read_target("commands/a.md"), "Z");

    // The new manifest records the checksum for Z.
    let manifest = tree.manifest_json();
    assert_eq!(manifest["files"]["commands/a.md"], digest_bytes(b"Z").as_str());

    // And the third run is clean: Z is the baseline now.
    let report = eng.sync(&mut Script::silent()).unwrap();
    assert_eq!(report.conflicts, 0);
    assert_eq!(report.installed, 0);
}

#[test]
fn two_runs_second_is_all_noop() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    tree.source_file("agents/helper.md", "H");
    tree.source_file("skills/s/f.md", "Y");
    let eng = engine(&tree, Mode::Copy);

    eng.sync(&mut Script::silent()).unwrap();
    let mtime = fs::metadata(tree.target_root().join("commands/a.md"))
        .unwrap()
        .modified()
        .unwrap();

    let second = eng.sync(&mut Script::silent()).unwrap();
    assert_eq!(second.installed, 0);
    assert_eq!(second.skipped, 3);

    // No mtime churn on untouched files.
    let mtime_after = fs::metadata(tree.target_root().join("commands/a.md"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(mtime, mtime_after);
}

#[test]
fn upstream_removal_cleans_file_and_empty_dirs() {
    let tree = TestTree::new();
    tree.source_file("skills/old/scripts/run.py", "py");
    tree.source_file("skills/keep/SKILL.md", "k");
    let eng = engine(&tree, Mode::Copy);
    eng.sync(&mut Script::silent()).unwrap();

    tree.remove_source("skills/old/scripts/run.py");
    let report = eng.sync(&mut Script::silent()).unwrap();
    assert_eq!(report.orphans_removed, 1);
    tree.assert_target_absent("skills/old");
    tree.assert_target_exists("skills/keep/SKILL.md");
    // The category root is never pruned.
    tree.assert_target_exists("skills");
}

#[test]
fn orphan_already_deleted_by_user_is_not_reported() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    tree.source_file("commands/old.md", "O");
    let eng = engine(&tree, Mode::Copy);
    eng.sync(&mut Script::silent()).unwrap();

    tree.remove_source("commands/old.md");
    fs::remove_file(tree.target_root().join("commands/old.md")).unwrap();

    let report = eng.sync(&mut Script::silent()).unwrap();
    assert_eq!(report.orphans_removed, 0);
}

#[test]
fn corrupt_manifest_recovers_as_fresh_install() {
    let tree = TestTree::new();
    tree.source_file("commands/a.md", "X");
    let eng = engine(&tree, Mode::Copy);
    eng.sync(&mut Script::silent()).unwrap();

    tree.target_file(".kitsync-manifest.json", "{ definitely not json");

    let report = eng.sync(&mut Script::silent()).unwrap();
    assert!(report.fresh_install);
    // Content identical, so the re-install is still a no-op write-wise.
    assert_eq!(report.installed, 0);
    assert_eq!(tree.manifest_json()["mode"], "copy");
}

#[test]
fn overwrite_all_latch_applies_to_remaining_conflicts() {
    let tree = TestTree::new();
    for i in 0..4 {
        tree.source_file(&format!("commands/{i}.md"), "src");
    }
    let eng = engine(&tree, Mode::Copy);
    eng.sync(&mut Script::silent()).unwrap();

    for i in 0..4 {
        tree.target_file(&format!("commands/{i}.md"), &format!("edit {i}"));
    }

    let mut prompt = Script::of(&[Decision::Keep, Decision::OverwriteAll]);
    let report = eng.sync(&mut prompt).unwrap();
    assert_eq!(report.conflicts, 4);
    assert_eq!(report.kept, 1);
    assert_eq!(prompt.asked, 2);
    assert_eq!(tree.read_target("commands/0.md"), "edit 0");
    assert_eq!(tree.read_target("commands/3.md"), "src");
}

#[cfg(unix)]
mod unix {
    use super::*;

    #[test]
    fn link_install_makes_one_group_link_per_skill() {
        let tree = TestTree::new();
        tree.source_file("skills/linear/SKILL.md", "doc");
        tree.source_file("skills/linear/scripts/linear.py", "py");
        tree.source_file("commands/a.md", "X");
        let eng = engine(&tree, Mode::Link);

        let report = eng.sync(&mut Script::silent()).unwrap();
        // One group link plus one file link.
        assert_eq!(report.installed, 2);

        let group = tree.target_root().join("skills/linear");
        assert!(fs::symlink_metadata(&group).unwrap().file_type().is_symlink());
        // Edits on the source side are visible immediately through the link.
        tree.source_file("skills/linear/SKILL.md", "doc v2");
        assert_eq!(tree.read_target("skills/linear/SKILL.md"), "doc v2");
    }

    #[test]
    fn deleted_skill_group_link_is_swept() {
        let tree = TestTree::new();
        tree.source_file("skills/old/SKILL.md", "doc");
        tree.source_file("skills/keep/SKILL.md", "doc");
        let eng = engine(&tree, Mode::Link);
        eng.sync(&mut Script::silent()).unwrap();

        tree.remove_source("skills/old/SKILL.md");
        fs::remove_dir_all(tree.source_root().join("skills/old")).unwrap();

        let report = eng.sync(&mut Script::silent()).unwrap();
        assert!(report.orphans_removed >= 1);
        tree.assert_target_absent("skills/old");
        tree.assert_target_exists("skills/keep");
    }

    #[test]
    fn copy_to_link_transition_aborts_on_local_edits_then_succeeds_with_force() {
        let tree = TestTree::new();
        tree.source_file("skills/s/f.md", "Y");
        tree.source_file("commands/a.md", "X");
        engine(&tree, Mode::Copy).sync(&mut Script::silent()).unwrap();

        tree.target_file("skills/s/f.md", "edited");

        let err = engine(&tree, Mode::Link).sync(&mut Script::silent()).unwrap_err();
        assert!(matches!(err, kit_core::Error::UnsafeModeTransition { .. }));
        // Aborted before touching anything: the command file is still real.
        let cmd = fs::symlink_metadata(tree.target_root().join("commands/a.md")).unwrap();
        assert!(!cmd.file_type().is_symlink());

        let report = forced(&tree, Mode::Link).sync(&mut Script::silent()).unwrap();
        assert_eq!(report.installed, 2);
        assert_eq!(tree.read_target("skills/s/f.md"), "Y");
    }

    #[test]
    fn legacy_symlink_target_is_migrated_then_reconciled() {
        let tree = TestTree::new();
        tree.source_file("commands/a.md", "X");
        tree.source_file("skills/s/f.md", "Y");

        // Simulate the predecessor: symlinks, no manifest.
        fs::create_dir_all(tree.target_root().join("commands")).unwrap();
        fs::create_dir_all(tree.target_root().join("skills")).unwrap();
        std::os::unix::fs::symlink(
            tree.source_root().join("commands/a.md"),
            tree.target_root().join("commands/a.md"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            tree.source_root().join("skills/s"),
            tree.target_root().join("skills/s"),
        )
        .unwrap();

        let report = engine(&tree, Mode::Link).sync(&mut Script::silent()).unwrap();
        assert!(report.migrated);
        assert!(!report.fresh_install);
        // Everything already points at the right place.
        assert_eq!(report.installed, 0);
        assert_eq!(report.skipped, 2);

        let manifest = tree.manifest_json();
        assert_eq!(manifest["mode"], "link");
        assert!(manifest["files"].get("skills/s/f.md").is_some());
    }

    #[test]
    fn link_to_copy_switch_materializes_real_files() {
        let tree = TestTree::new();
        tree.source_file("skills/s/f.md", "Y");
        engine(&tree, Mode::Link).sync(&mut Script::silent()).unwrap();

        let report = engine(&tree, Mode::Copy).sync(&mut Script::silent()).unwrap();
        assert_eq!(report.installed, 1);
        let f = fs::symlink_metadata(tree.target_root().join("skills/s/f.md")).unwrap();
        assert!(f.is_file() && !f.file_type().is_symlink());
        // Source survived the switch.
        assert_eq!(
            fs::read_to_string(tree.source_root().join("skills/s/f.md")).unwrap(),
            "Y"
        );
    }
}
