use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

const ACCOUNT: &str = "76561198000000000";

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn catalog_path() -> String {
    workspace_root()
        .join("tests/catalog/data.json")
        .to_string_lossy()
        .to_string()
}

fn temp_root(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "ror2_unlocker_cli_{prefix}_{}_{}",
        std::process::id(),
        nanos
    ))
}

fn install_profile(root: &Path, file: &str, fixture: &str) -> PathBuf {
    let dir = root
        .join("userdata")
        .join(ACCOUNT)
        .join("632360")
        .join("remote")
        .join("UserProfiles");
    fs::create_dir_all(&dir).expect("failed to create profile dir");
    let path = dir.join(file);
    fs::copy(workspace_root().join("tests/profiles").join(fixture), &path)
        .expect("failed to copy fixture");
    path
}

fn run_cli(root: &Path, args: &[&str]) -> std::process::Output {
    let root = root.to_string_lossy().to_string();
    Command::new(env!("CARGO_BIN_EXE_ror2-unlocker"))
        .arg("--root")
        .arg(&root)
        .args(args)
        .output()
        .expect("failed to run ror2-unlocker CLI")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn list_reports_discovered_profiles() {
    let root = temp_root("list");
    install_profile(&root, "p.xml", "veteran_profile.xml");

    let output = run_cli(&root, &["--json", "list"]);
    assert!(output.status.success());
    let value = stdout_json(&output);
    let id = format!("{ACCOUNT}_p.xml");
    assert_eq!(value[0]["id"], id.as_str());
    assert_eq!(value[0]["steam_id"], ACCOUNT);
    assert_eq!(value[0]["name"], "Veteran");

    let text = run_cli(&root, &["list"]);
    assert!(text.status.success());
    assert!(String::from_utf8_lossy(&text.stdout).contains("Veteran"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn show_prints_profile_summary() {
    let root = temp_root("show");
    install_profile(&root, "p.xml", "veteran_profile.xml");
    let id = format!("{ACCOUNT}_p.xml");

    let output = run_cli(&root, &["--json", "show", &id]);
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["coins"], 120);
    assert_eq!(value["logbook_total"], 3);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn unknown_profile_exits_with_failure() {
    let root = temp_root("unknown");
    fs::create_dir_all(&root).expect("failed to create root");

    let output = run_cli(&root, &["show", "missing_p.xml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error opening profile"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn repeated_unlock_is_rejected_with_exit_code_two() {
    let root = temp_root("unlock");
    let path = install_profile(&root, "p.xml", "sample_profile.xml");
    let id = format!("{ACCOUNT}_p.xml");

    let first = run_cli(&root, &["--json", "unlock", &id, "Characters.Huntress"]);
    assert!(first.status.success());
    assert_eq!(
        stdout_json(&first),
        serde_json::json!({"success": true, "count": 1})
    );
    let written = fs::read_to_string(&path).expect("profile readable");
    assert!(written.contains("Characters.Huntress"));

    let second = run_cli(&root, &["--json", "unlock", &id, "characters.huntress"]);
    assert_eq!(second.status.code(), Some(2));
    let value = stdout_json(&second);
    assert_eq!(value["success"], false);
    assert_eq!(value["reason"], "conflict");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn coins_are_clamped() {
    let root = temp_root("coins");
    install_profile(&root, "p.xml", "veteran_profile.xml");
    let id = format!("{ACCOUNT}_p.xml");

    let output = run_cli(&root, &["coins", &id, "-5"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "coins=0");

    let output = run_cli(&root, &["--json", "coins", &id, "9999999999"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["coins"], 2_147_483_647_i64);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn unlock_all_uses_catalog_and_keeps_backup() {
    let root = temp_root("unlock_all");
    let path = install_profile(&root, "p.xml", "sample_profile.xml");
    let original = fs::read_to_string(&path).expect("profile readable");
    let id = format!("{ACCOUNT}_p.xml");
    let catalog = catalog_path();

    let output = run_cli(&root, &["--catalog", &catalog, "--json", "unlock-all", &id]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["count"], 19);

    let backup = path.with_file_name("p.xml.bak");
    assert_eq!(
        fs::read_to_string(&backup).expect("backup readable"),
        original
    );

    let again = run_cli(&root, &["--catalog", &catalog, "unlock-all", &id]);
    assert!(again.status.success());
    assert_eq!(String::from_utf8_lossy(&again.stdout).trim(), "ok (0 changed)");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn catalog_command_prints_loaded_catalog() {
    let root = temp_root("catalog");
    fs::create_dir_all(&root).expect("failed to create root");
    let catalog = catalog_path();

    let output = run_cli(&root, &["--catalog", &catalog, "catalog"]);
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert!(value["Characters"]["Huntress"].is_object());
    assert_eq!(value["Achievements"][2], "KillBossQuick");

    let _ = fs::remove_dir_all(&root);
}
