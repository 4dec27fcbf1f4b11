//! CLI end-to-end tests
//!
//! Tests for the issuesync command-line interface.

mod common;

use assert_cmd::prelude::*;
use common::write_edition_zip;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the issuesync binary
#[allow(deprecated)]
fn issuesync_cmd() -> Command {
    let mut cmd = Command::cargo_bin("issuesync").unwrap();
    cmd.env("USER", "tester").env_remove("RUST_LOG");
    cmd
}

const MEMBERS: &[&str] = &[
    "Issue 9400/cover.jpg",
    "Issue 9400/Issue 9400 - 1 The world this week - Politics.mp3",
    "Issue 9400/Issue 9400 - 2 The world this week - Business.mp3",
    "Issue 9400/Issue 9400 - 3 Leaders - Editor's note.mp3",
    "Issue 9400/Issue 9400 - 4 Letters - On inflation.mp3",
    "Issue 9400/Issue 9400 - 5 Science & technology - Atoms.mp3",
];

/// A download directory with one edition, a mounted device, and a config
/// pointing at both.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(mode: &str) -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("downloads")).unwrap();
        fs::create_dir(dir.path().join("device")).unwrap();
        write_edition_zip(
            &dir.path().join("downloads/TheEconomist.2024.06.01.zip"),
            MEMBERS,
        );

        let config = format!(
            r#"
[source]
download_dir = "{downloads}"

[target]
root = "{root}"
skip_sections = ["Letters"]

[transform]
mode = "{mode}"

[scheduler]
concurrency = 2
launch_delay_ms = 0
sync_passes = 1
"#,
            downloads = dir.path().join("downloads").display(),
            root = dir.path().join("device/ec").display(),
        );
        fs::write(dir.path().join("issuesync.toml"), config).unwrap();

        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("issuesync.toml")
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("device/ec")
    }

    fn archive(&self) -> PathBuf {
        self.dir.path().join("downloads/TheEconomist.2024.06.01.zip")
    }
}

fn list(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = issuesync_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("issuesync"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = issuesync_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("issuesync"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = issuesync_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_global_flag_before_subcommand() {
    let mut cmd = issuesync_cmd();
    cmd.args(["--verbose", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_config_before_validate() {
    let fixture = Fixture::new("copy");
    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
    assert!(!fixture.root().exists());
}

#[test]
fn test_cli_two_archives_is_usage_error() {
    let mut cmd = issuesync_cmd();
    cmd.args(["a.zip", "b.zip"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_cli_nonexistent_archive() {
    let fixture = Fixture::new("copy");
    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg("/nonexistent/path/edition.zip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    assert!(!fixture.root().exists());
}

#[test]
fn test_cli_check_tools_command() {
    let fixture = Fixture::new("copy");
    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("sox"))
        .stdout(predicate::str::contains("ffmpeg"));
}

#[test]
fn test_cli_validate_config() {
    let fixture = Fixture::new("copy");
    let mut cmd = issuesync_cmd();
    cmd.arg("validate")
        .arg(fixture.config())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Workers: 2"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[transform]\ntempo = 0.0\n[target]\nroot = \"/mnt/ec\"\n").unwrap();

    let mut cmd = issuesync_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("tempo"));
}

#[test]
fn test_cli_dry_run_leaves_device_alone() {
    let fixture = Fixture::new("copy");
    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("00-The_world_this_week/"))
        .stdout(predicate::str::contains("3-Editors_note.mp3"))
        .stdout(predicate::str::contains("skip Letters"));
    assert!(!fixture.root().exists());
}

#[test]
fn test_cli_dry_run_json() {
    let fixture = Fixture::new("copy");
    let output = issuesync_cmd()
        .arg("--config")
        .arg(fixture.config())
        .arg("--dry-run")
        .arg("--json")
        .arg(fixture.archive())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let start = stdout.find('{').unwrap();
    let end = stdout.rfind('}').unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout[start..=end]).unwrap();
    assert_eq!(json["jobs"].as_array().unwrap().len(), 4);
    assert_eq!(json["sections"][2]["name"], "02-Science_technology");
    assert_eq!(json["skipped"][0], "Letters");
}

#[test]
fn test_cli_full_run_in_copy_mode() {
    let fixture = Fixture::new("copy");
    fs::create_dir(fixture.root()).unwrap();
    fs::write(fixture.root().join("last-week.mp3"), "old").unwrap();

    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .assert()
        .success()
        .stdout(predicate::str::contains("TheEconomist.2024.06.01.zip"))
        .stdout(predicate::str::contains("Section: Leaders"))
        .stdout(predicate::str::contains("Finished in"));

    let root = fixture.root();
    assert_eq!(
        list(&root),
        ["00-The_world_this_week", "01-Leaders", "02-Science_technology"]
    );
    assert_eq!(
        list(&root.join("00-The_world_this_week")),
        ["1-Politics.mp3", "2-Business.mp3"]
    );
    assert_eq!(
        fs::read_to_string(root.join("01-Leaders/3-Editors_note.mp3")).unwrap(),
        "Issue 9400/Issue 9400 - 3 Leaders - Editor's note.mp3"
    );
}

#[test]
fn test_cli_invalid_manifest_keeps_device_contents() {
    let fixture = Fixture::new("copy");
    // Both members normalize to 00-Leaders/1-Note.mp3.
    let archive = fixture.dir.path().join("downloads/clash.zip");
    write_edition_zip(&archive, &["1 Leaders - Note.mp3", "1 Leaders - !Note.mp3"]);
    fs::create_dir(fixture.root()).unwrap();
    fs::write(fixture.root().join("last-week.mp3"), "old").unwrap();

    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate destination"));

    assert_eq!(list(&fixture.root()), ["last-week.mp3"]);
}

#[test]
fn test_cli_unmounted_device_fails() {
    let fixture = Fixture::new("copy");
    fs::remove_dir(fixture.dir.path().join("device")).unwrap();

    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .arg(fixture.archive())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is the device mounted"));
    assert!(!fixture.dir.path().join("device").exists());
}

#[cfg(unix)]
#[test]
fn test_cli_tool_failure_fails_the_run() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new("tempo");
    let sox = fixture.dir.path().join("fake-sox");
    fs::write(&sox, "#!/bin/sh\necho 'sox FAIL formats' >&2\nexit 2\n").unwrap();
    fs::set_permissions(&sox, fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = fs::read_to_string(fixture.config()).unwrap();
    config.push_str(&format!("\n[tools]\nsox_path = \"{}\"\n", sox.display()));
    fs::write(fixture.config(), config).unwrap();

    let mut cmd = issuesync_cmd();
    cmd.arg("--config")
        .arg(fixture.config())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sox FAIL formats"));
}
