#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        Self { temp }
    }

    fn root(&self) -> PathBuf {
        self.temp.path().join("library")
    }

    fn config_dir(&self) -> PathBuf {
        self.temp.path().join("config")
    }

    /// A command with no root selected.
    fn bare(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("reelbox"));
        cmd.env("REELBOX_CONFIG_DIR", self.config_dir())
            .env_remove("REELBOX__ROOT")
            .env_remove("REELBOX__LEGACY_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    fn cmd(&self) -> Command {
        let mut cmd = self.bare();
        cmd.arg("--root").arg(self.root());
        cmd
    }

    fn audio_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }
}

#[test]
fn test_without_root_explains_how_to_pick_one() {
    let env = Env::new();
    env.bare()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--root"));
}

#[test]
fn test_root_from_config_file() {
    let env = Env::new();
    fs::write(
        env.config_dir().join("reelbox.toml"),
        format!("root = {:?}\n", env.root().display().to_string()),
    )
    .unwrap();

    env.bare()
        .assert()
        .success()
        .stdout(predicate::str::contains("Recordings: 0"));
    assert!(env.root().join("library.json").is_file());
}

#[test]
fn test_folders_and_recordings_workflow() {
    let env = Env::new();
    let take = env.audio_file("take.webm", b"take audio");

    env.cmd()
        .args(["folder", "add", "Beats/Trap"])
        .assert()
        .success();
    assert!(env.root().join("Beats/Trap").is_dir());

    env.cmd()
        .args(["rec", "add"])
        .arg(&take)
        .args(["-f", "Beats/Trap", "-t", "First take"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Beats/Trap"));
    assert_eq!(
        fs::read(env.root().join("Beats/Trap/take.webm")).unwrap(),
        b"take audio"
    );

    env.cmd()
        .args(["rec", "ls", "Beats/Trap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("First take"));

    env.cmd()
        .args(["folder", "rename", "Beats/Trap", "Drill"])
        .assert()
        .success();
    assert!(env.root().join("Beats/Drill/take.webm").is_file());
    assert!(!env.root().join("Beats/Trap").exists());

    env.cmd()
        .args(["rec", "tag", "First take", "-a", "drums", "--rating", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#drums"));

    env.cmd()
        .args(["rec", "cat", "First take"])
        .assert()
        .success()
        .stdout(b"take audio" as &'static [u8]);

    env.cmd()
        .args(["rec", "where", "First take"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drill").and(predicate::str::contains("take.webm")));

    env.cmd()
        .args(["rec", "mv", "First take"])
        .assert()
        .success();
    assert!(env.root().join("take.webm").is_file());

    env.cmd().arg("doctor").assert().success();
}

#[test]
fn test_rec_ls_json_lists_metadata() {
    let env = Env::new();
    let take = env.audio_file("loop.webm", b"loop");
    env.cmd().args(["rec", "add"]).arg(&take).assert().success();

    let output = env.cmd().args(["rec", "ls", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["filename"], "loop.webm");
    assert_eq!(json[0]["tabTitle"], "loop");
}

#[test]
fn test_unknown_names_are_reported() {
    let env = Env::new();
    env.cmd().args(["folder", "add", "Vox"]).assert().success();
    env.cmd()
        .args(["folder", "mv", "Vox", "Missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No folder at"));
    env.cmd()
        .args(["rec", "rm", "nothing-here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No recording matches"));
}

#[test]
fn test_legacy_store_is_imported_on_start() {
    let env = Env::new();
    let legacy = env.config_dir().join("legacy");
    fs::create_dir_all(legacy.join("blobs")).unwrap();
    fs::write(
        legacy.join("legacy.json"),
        r#"{
            "folders": [{"id": "f1", "name": "Old"}],
            "recordings": [{"id": "r1", "filename": "old.webm", "folderId": "f1", "tabTitle": "Old take"}]
        }"#,
    )
    .unwrap();
    fs::write(legacy.join("blobs/r1"), b"legacy audio").unwrap();
    fs::write(legacy.join("blobs/r1.mime"), "audio/webm").unwrap();

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 1 recording(s)"));
    assert_eq!(
        fs::read(env.root().join("Old/old.webm")).unwrap(),
        b"legacy audio"
    );

    // Completed migrations do not run again.
    env.cmd()
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to migrate"));
}
