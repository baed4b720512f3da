use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
    vault: TempDir,
}

impl Env {
    fn new() -> Self {
        Env {
            home: TempDir::new().unwrap(),
            vault: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("notesync").unwrap();
        cmd.env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("NOTION_API_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }

    fn note(&self, folder: &str, name: &str, text: &str) {
        let dir = self.vault.path().join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn init_with(&self, folder: &str) {
        self.cmd().arg("init").arg(self.vault.path()).assert().success();
        self.cmd()
            .args(["collections", "add", folder, "db-123"])
            .assert()
            .success();
    }
}

fn config_path(home: &Path) -> std::path::PathBuf {
    home.join(".notesync").join("config.yaml")
}

#[test]
fn init_writes_config() {
    let env = Env::new();
    env.cmd()
        .arg("init")
        .arg(env.vault.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault set to"));
    let yaml = std::fs::read_to_string(config_path(env.home.path())).unwrap();
    assert!(yaml.contains("tag_key: hubs"));
}

#[test]
fn collections_list_json_reports_note_counts() {
    let env = Env::new();
    env.note("resource", "a.md", "a");
    env.note("resource", "b.md", "b");
    env.note("resource", "skip.txt", "c");
    env.init_with("resource");

    let output = env
        .cmd()
        .args(["collections", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["folder"], "resource");
    assert_eq!(rows[0]["database_id"], "db-123");
    assert_eq!(rows[0]["notes"], 2);
}

#[test]
fn sync_without_config_explains_init() {
    let env = Env::new();
    env.cmd()
        .args(["sync", "resource", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("notesync init"));
}

#[test]
fn sync_unknown_folder_fails() {
    let env = Env::new();
    env.init_with("resource");
    env.cmd()
        .args(["sync", "video", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("video"));
}

#[test]
fn sync_without_token_fails_outside_dry_run() {
    let env = Env::new();
    env.note("resource", "a.md", "a");
    env.init_with("resource");
    env.cmd()
        .args(["sync", "resource"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOTION_API_TOKEN"));
}

#[test]
fn dry_run_reports_each_note() {
    let env = Env::new();
    env.note(
        "resource",
        "2024-02-27_Dotfiles-stuff.md",
        "---\nhubs: [\"[[macos]]\"]\n---\n# Dotfiles stuff\n\ntext\n",
    );
    env.note("resource", "Plain-note.md", "hello");
    env.init_with("resource");

    env.cmd()
        .args(["sync", "resource", "--dry-run", "--pacing-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+  Dotfiles stuff"))
        .stdout(predicate::str::contains("+  Plain note"))
        .stdout(predicate::str::contains(
            "[dry-run] ✓ 'resource' synced (2 created, 0 replaced, 0 skipped, 0 failed)",
        ));
}

#[test]
fn unreadable_frontmatter_fails_the_run() {
    let env = Env::new();
    env.note("resource", "bad.md", "---\n- not\n- a mapping\n---\nbody\n");
    env.note("resource", "good.md", "fine");
    env.init_with("resource");

    env.cmd()
        .args(["sync", "--all", "--dry-run", "--pacing-ms", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("+  good"))
        .stdout(predicate::str::contains("1 failed"));
}

#[test]
fn missing_folder_does_not_stop_other_folders() {
    let env = Env::new();
    env.init_with("aaa-missing");
    env.note("good", "Kept-note.md", "hello");
    env.cmd()
        .args(["collections", "add", "good", "db-456"])
        .assert()
        .success();

    env.cmd()
        .args(["sync", "--all", "--dry-run", "--pacing-ms", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗  'aaa-missing': cannot scan folder"))
        .stdout(predicate::str::contains("+  Kept note"))
        .stdout(predicate::str::contains("'good' synced (1 created"));
}

#[test]
fn missing_folder_stops_the_run_with_abort() {
    let env = Env::new();
    env.init_with("aaa-missing");
    env.note("good", "Kept-note.md", "hello");
    env.cmd()
        .args(["collections", "add", "good", "db-456"])
        .assert()
        .success();

    env.cmd()
        .args(["sync", "--all", "--dry-run", "--abort-on-failure"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("'aaa-missing'"))
        .stdout(predicate::str::contains("Kept note").not());
}

#[test]
fn inspect_prints_properties_and_blocks() {
    let env = Env::new();
    env.note(
        "resource",
        "2024-02-27_Dotfiles-stuff.md",
        "---\nhubs:\n  - \"[[macos]]\"\n  - linux\nurls:\n  - https://example.com\n---\n# Dotfiles stuff\n\nStow it.\n",
    );
    let file = env.vault.path().join("resource/2024-02-27_Dotfiles-stuff.md");

    let output = env.cmd().arg("inspect").arg(&file).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["title"], "Dotfiles stuff");
    assert_eq!(value["date"], "2024-02-27");
    assert_eq!(
        value["properties"]["Tags"]["multi_select"][1]["name"],
        "linux"
    );
    let blocks = value["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0]["paragraph"]["rich_text"][0]["text"]["link"]["url"],
        "https://example.com"
    );
}

#[test]
fn inspect_empty_tier_has_no_blocks() {
    let env = Env::new();
    env.note("resource", "n.md", "# Title\n\nbody");
    let file = env.vault.path().join("resource/n.md");
    let output = env
        .cmd()
        .args(["inspect", "--tier", "empty"])
        .arg(&file)
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tier"], "empty");
    assert!(value["blocks"].as_array().unwrap().is_empty());
}
