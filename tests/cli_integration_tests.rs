// End-to-end tests of the decaf-rename binary inside throwaway git repositories

use assert_cmd::Command;
use git2::{Repository, Signature};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn git_repo_with(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        std::fs::write(temp_dir.path().join(path), content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let signature = Signature::now("Test User", "test@example.com").unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
        .unwrap();
    temp_dir
}

fn decaf_rename(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("decaf-rename").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn head_message(dir: &Path) -> String {
    let repo = Repository::open(dir).unwrap();
    let commit = repo.head().unwrap().peel_to_commit().unwrap();
    commit.message().unwrap().to_string()
}

#[test]
fn test_help_describes_the_workflow() {
    Command::cargo_bin("decaf-rename")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--policy"))
        .stdout(predicate::str::contains("--no-wait"))
        .stdout(predicate::str::contains("<FILE>"));
}

#[test]
fn test_missing_file_argument_is_a_usage_error() {
    Command::cargo_bin("decaf-rename")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("<FILE>"));
}

#[test]
fn test_full_run_with_stand_in_converter() {
    let dir = git_repo_with(&[("app.coffee", "x = 1\n")]);

    decaf_rename(dir.path())
        .args(["--converter", "true", "app.coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("renaming app.coffee to app.js"));

    assert!(dir.path().join("app.coffee").exists());
    assert!(!dir.path().join("app.js").exists());
    assert!(!dir.path().join("app.coffee.bak").exists());
    assert_eq!(head_message(dir.path()), "renaming app.coffee to app.js");
}

#[test]
fn test_converter_failure_sets_nonzero_exit_code() {
    let dir = git_repo_with(&[("app.coffee", "x = 1\n")]);

    decaf_rename(dir.path())
        .args(["--converter", "false", "app.coffee"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("convert"));

    // the rename commit still happened before the converter ran
    assert_eq!(head_message(dir.path()), "renaming app.coffee to app.js");
    assert!(dir.path().join("app.coffee").exists());
}

#[test]
fn test_missing_converter_is_reported() {
    let dir = git_repo_with(&[("app.coffee", "x = 1\n")]);

    decaf_rename(dir.path())
        .args(["--converter", "definitely_not_a_converter_xyz", "app.coffee"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Converter not found"));
}

#[test]
fn test_file_without_coffee_segment_is_rejected() {
    let dir = git_repo_with(&[("README.md", "# readme\n")]);

    decaf_rename(dir.path())
        .args(["--converter", "true", "README.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--allow-unchanged"));

    assert_eq!(head_message(dir.path()), "Initial commit");
}

#[test]
fn test_allow_unchanged_commits_pending_edits_without_renaming() {
    let dir = git_repo_with(&[("README.md", "# readme\n")]);
    std::fs::write(dir.path().join("README.md"), "# readme\n\nmore\n").unwrap();

    decaf_rename(dir.path())
        .args(["--converter", "true", "--allow-unchanged", "README.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("renaming README.md to README.md"));

    assert_eq!(head_message(dir.path()), "renaming README.md to README.md");
    assert!(!dir.path().join("README.md.bak").exists());
}

#[test]
fn test_outside_a_repository_nothing_is_touched() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.coffee"), "x = 1\n").unwrap();

    decaf_rename(dir.path())
        .args(["--converter", "true", "app.coffee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("git working tree"));

    assert!(dir.path().join("app.coffee").exists());
    assert!(!dir.path().join("app.coffee.bak").exists());
}

#[test]
fn test_halt_policy_from_config_file() {
    let dir = git_repo_with(&[("app.coffee", "x = 1\n")]);
    std::fs::write(dir.path().join("app.js"), "// already converted\n").unwrap();
    std::fs::write(
        dir.path().join("decaf-rename.toml"),
        "[pipeline]\nfailure_policy = \"halt\"\n\n[converter]\nprogram = \"true\"\n",
    )
    .unwrap();

    decaf_rename(dir.path())
        .arg("app.coffee")
        .assert()
        .failure()
        .stdout(predicate::str::contains("rename_forward"));

    assert_eq!(head_message(dir.path()), "Initial commit");
    assert_eq!(std::fs::read_to_string(dir.path().join("app.coffee")).unwrap(), "x = 1\n");
}
