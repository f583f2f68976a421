//! End-to-end tests of the `fglpool` binary.

mod support;

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch directory holding the config, database and import files.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// The binary pointed at this workspace's config and database.
    fn fglpool(&self) -> Command {
        let mut cmd = self.bare();
        cmd.arg("--db").arg(self.path("pool.db"));
        cmd
    }

    /// Without `--db`, so the config and environment decide.
    fn bare(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("fglpool");
        cmd.current_dir(self.dir.path())
            .env_remove("FGLPOOL_DATABASE")
            .env_remove("RUST_LOG")
            .args(["--color", "never", "--config"])
            .arg(self.path("config.toml"));
        cmd
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Season initialised and the two-gameweek document imported.
    fn seeded() -> Self {
        let ws = Self::new();
        ws.fglpool()
            .args(["init", "--name", "Cli season", "--allowance", "100"])
            .assert()
            .success();
        let doc = ws.write("season.json", &support::season::two_gameweeks().to_string());
        ws.fglpool().arg("import").arg(doc).assert().success();
        ws
    }
}

fn json_stdout(output: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(output);
    let last = text.lines().last().expect("json output");
    serde_json::from_str(last).expect("valid json")
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("fglpool")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fglpool"))
        .stdout(predicate::str::contains("wager"))
        .stdout(predicate::str::contains("results"))
        .stdout(predicate::str::contains("standings"));
}

#[test]
fn version_prints_name() {
    cargo_bin_cmd!("fglpool")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fglpool"));
}

#[test]
fn init_without_config_uses_defaults() {
    let ws = Workspace::new();
    ws.fglpool()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Season Season ready"))
        .stdout(predicate::str::contains("100.00"));
    assert!(exists(&ws.path("pool.db")));
}

#[test]
fn init_reads_season_defaults_from_config() {
    let ws = Workspace::new();
    ws.write(
        "config.toml",
        "[season]\nname = \"Config season\"\nbase_allowance = \"40.00\"\n",
    );
    let out = ws.fglpool().args(["--json", "init"]).output().unwrap();
    assert!(out.status.success());
    let value = json_stdout(&out.stdout);
    assert_eq!(value["command"], "init");
    assert_eq!(value["season"]["name"], "Config season");
}

#[test]
fn database_follows_config_then_environment() {
    let ws = Workspace::new();
    let configured = ws.path("configured.db");
    ws.write(
        "config.toml",
        &format!("database = {:?}\n", configured.to_string_lossy()),
    );
    ws.bare().arg("init").assert().success();
    assert!(exists(&configured));

    let from_env = ws.path("env.db");
    ws.bare()
        .env("FGLPOOL_DATABASE", &from_env)
        .arg("init")
        .assert()
        .success();
    assert!(exists(&from_env));
}

#[test]
fn full_gameweek_from_the_command_line() {
    let ws = Workspace::seeded();

    ws.fglpool()
        .args(["wager", "place", "--player", "one", "--gameweek", "1", "--stake", "100", "--leg", "g1=H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wager placed"));
    ws.fglpool()
        .args(["wager", "place", "--player", "two", "--gameweek", "1", "--stake", "50", "--leg", "g1=A"])
        .assert()
        .success();
    ws.fglpool()
        .args(["allowance", "--player", "two", "--gameweek", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.00"));

    ws.fglpool()
        .args(["results", "--gameweek", "1", "g1=H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 game(s) still pending"));
    ws.fglpool()
        .args(["results", "--gameweek", "1", "g2=A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gameweek 1 settled"));

    let out = ws.fglpool().args(["--json", "standings"]).output().unwrap();
    assert!(out.status.success());
    let value = json_stdout(&out.stdout);
    assert_eq!(value["standings"]["gameweek"], 1);
    let rows = value["standings"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["player"], "one");
    assert_eq!(rows[1]["player"], "two");

    ws.fglpool()
        .args(["wager", "list", "--gameweek", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("g1=H"));
}

#[test]
fn proposition_bets_from_the_command_line() {
    let ws = Workspace::seeded();
    ws.fglpool()
        .args(["proposition", "bet", "--pool", "title", "--player", "one", "--option", "one"])
        .assert()
        .success();

    let out = ws
        .fglpool()
        .args(["--json", "proposition", "declare", "--pool", "title", "--winner", "one", "--gameweek", "1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value = json_stdout(&out.stdout);
    assert_eq!(value["report"]["impacts"][0]["player"], "one");
    assert_eq!(value["report"]["impacts"][0]["applied"], false);
}

#[test]
fn overspending_fails_with_a_diagnostic() {
    let ws = Workspace::seeded();
    ws.fglpool()
        .args(["wager", "place", "--player", "one", "--gameweek", "1", "--stake", "500", "--leg", "g1=H"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exceeds remaining allowance"));
}

#[test]
fn json_errors_go_to_stderr() {
    let ws = Workspace::new();
    ws.fglpool()
        .args(["--json", "wager", "place", "--player", "one", "--gameweek", "1", "--stake", "5", "--leg", "g1=H"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("\"type\":\"error\""))
        .stderr(predicate::str::contains("no season"));
}

#[test]
fn malformed_config_is_reported() {
    let ws = Workspace::new();
    ws.write("config.toml", "[season]\nbase_allowance = [1, 2]\n");
    ws.fglpool()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fglpool::config"));
}

#[test]
fn bad_legs_are_rejected_by_the_parser() {
    let ws = Workspace::new();
    ws.fglpool()
        .args(["wager", "place", "--player", "one", "--gameweek", "1", "--stake", "5", "--leg", "g1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GAME=VALUE"));
}
