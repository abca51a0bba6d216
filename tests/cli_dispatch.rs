use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use uuid::Uuid;

fn unique_workspace(prefix: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&root).expect("workspace should be creatable");
    root
}

fn run_machete(root: &Path, args: &[&str]) -> Output {
    let db_path = root.join("machete.sqlite");
    let config_path = root.join("config.toml");
    Command::new(env!("CARGO_BIN_EXE_machete"))
        .current_dir(root)
        .env_remove("MACHETE_LOCALE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--db")
        .arg(&db_path)
        .arg("--config")
        .arg(&config_path)
        .arg("--user")
        .arg("tester")
        .args(args)
        .output()
        .expect("machete command should run")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn init_store(prefix: &str) -> PathBuf {
    let root = unique_workspace(prefix);
    let init = run_machete(&root, &["init"]);
    assert_success(&init);
    assert!(String::from_utf8_lossy(&init.stdout).contains("local store ready"));
    root
}

fn add_worker(root: &Path, card: &str, first: &str) {
    assert_success(&run_machete(
        root,
        &["worker", "add", card, first, "Ramirez", "--skill", "GeneralLabor"],
    ));
}

fn add_order_with_slot(root: &Path) {
    assert_success(&run_machete(
        root,
        &["employer", "add", "Acme Landscaping", "--zip", "98122"],
    ));
    assert_success(&run_machete(
        root,
        &[
            "order",
            "add",
            "1",
            "--when",
            "2024-03-10 09:00",
            "--contact",
            "Ann",
            "--address",
            "1 Main St",
            "--phone",
            "206-555-0100",
            "--zip",
            "98122",
        ],
    ));
    assert_success(&run_machete(
        root,
        &["assign", "add", "1", "--skill", "60", "--hours", "4", "--wage", "18.5"],
    ));
}

#[test]
fn init_writes_config_and_is_rerunnable() {
    let root = init_store("machete-cli-init");
    assert!(root.join("config.toml").exists());
    assert!(root.join("machete.sqlite").exists());

    let again = run_machete(&root, &["init"]);
    assert_success(&again);
    assert!(String::from_utf8_lossy(&again.stdout).contains("keeping existing config"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn lookup_resolve_accepts_key_or_id() {
    let root = init_store("machete-cli-lookup");

    let by_key = run_machete(&root, &["lookup", "resolve", "memberstatus", "Active"]);
    assert_success(&by_key);
    assert_eq!(String::from_utf8_lossy(&by_key.stdout).trim(), "1");

    let by_id = run_machete(&root, &["lookup", "resolve", "skill", "60"]);
    assert_success(&by_id);
    assert_eq!(String::from_utf8_lossy(&by_id.stdout).trim(), "60");

    let missing = run_machete(&root, &["lookup", "resolve", "skill", "Juggling"]);
    assert_failure(&missing);
    assert!(stderr_text(&missing).contains("Unable to Lookup Category: skill"));

    let list = run_machete(&root, &["lookup", "list", "-c", "worktype", "--json"]);
    assert_success(&list);
    let rows = stdout_json(&list);
    assert_eq!(rows.as_array().map(Vec::len), Some(2));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn worker_add_and_show_round_trip_through_json() {
    let root = init_store("machete-cli-worker");
    add_worker(&root, "30001", "Jose");

    let show = run_machete(&root, &["worker", "show", "30001", "--json"]);
    assert_success(&show);
    let view = stdout_json(&show);
    assert_eq!(view["dwccardnum"], 30001);
    assert_eq!(view["first_name"], "Jose");
    assert_eq!(view["member_status_text"], "Active");

    let unknown = run_machete(&root, &["worker", "show", "99999"]);
    assert_failure(&unknown);
    assert!(stderr_text(&unknown).contains("worker with card 99999 not found"));

    let duplicate = run_machete(&root, &["worker", "add", "30001", "Other", "Person"]);
    assert_failure(&duplicate);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn dispatch_requires_signin_unless_forced() {
    let root = init_store("machete-cli-dispatch");
    add_worker(&root, "30001", "Jose");
    add_worker(&root, "30002", "Luis");
    add_order_with_slot(&root);

    let refused = run_machete(&root, &["assign", "dispatch", "1", "30002"]);
    assert_failure(&refused);
    assert!(stderr_text(&refused).contains("has not signed in on 2024-03-10"));

    assert_success(&run_machete(
        &root,
        &["signin", "add", "30001", "--at", "2024-03-10 07:30"],
    ));
    let dispatched = run_machete(&root, &["assign", "dispatch", "1", "30001"]);
    assert_success(&dispatched);
    assert!(String::from_utf8_lossy(&dispatched.stdout).contains("dispatched card 30001"));

    let taken = run_machete(&root, &["assign", "dispatch", "1", "30002", "--force"]);
    assert_failure(&taken);
    assert!(stderr_text(&taken).contains("already dispatched"));

    let daily = run_machete(&root, &["report", "daily", "2024-03-10", "--json"]);
    assert_success(&daily);
    let summary = stdout_json(&daily);
    assert_eq!(summary["date"], "2024-03-10");
    assert_eq!(summary["total_signins"], 1);
    assert_eq!(summary["total_assignments"], 1);
    assert_eq!(summary["dwc_count"], 1);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn second_signin_on_same_day_conflicts() {
    let root = init_store("machete-cli-signin");
    add_worker(&root, "30001", "Jose");

    assert_success(&run_machete(
        &root,
        &["signin", "add", "30001", "--at", "2024-03-10 07:30"],
    ));
    let again = run_machete(&root, &["signin", "add", "30001", "--at", "2024-03-10 08:15"]);
    assert_failure(&again);
    assert!(stderr_text(&again).contains("already signed in on 2024-03-10"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn report_arguments_are_validated() {
    let root = init_store("machete-cli-report");

    let bad_type = run_machete(
        &root,
        &["report", "workers", "2024-01-01", "2024-03-31", "--type", "daily"],
    );
    assert_failure(&bad_type);
    assert!(stderr_text(&bad_type).contains("Report type must be"));

    let bad_date = run_machete(&root, &["report", "daily", "03/10/2024"]);
    assert_failure(&bad_date);
    assert!(stderr_text(&bad_date).contains("YYYY-MM-DD"));

    let weekly = run_machete(
        &root,
        &["report", "weekly", "2024-03-04", "2024-03-10", "--json"],
    );
    assert_success(&weekly);
    assert_eq!(stdout_json(&weekly).as_array().map(Vec::len), Some(7));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn doctor_passes_on_fresh_store() {
    let root = init_store("machete-cli-doctor");

    let doctor = run_machete(&root, &["doctor", "--json"]);
    assert_success(&doctor);
    let report = stdout_json(&doctor);
    let checks = report["checks"].as_array().expect("checks array");
    assert_eq!(checks.len(), 4);
    assert!(checks.iter().all(|check| check["status"] == "pass"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn completions_print_without_a_store() {
    let root = unique_workspace("machete-cli-completions");
    let output = run_machete(&root, &["completions", "bash"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("machete"));
    assert!(!root.join("machete.sqlite").exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn human_listings_render_lookup_text() {
    let root = init_store("machete-cli-listings");
    add_order_with_slot(&root);

    let orders = run_machete(&root, &["order", "list"]);
    assert_success(&orders);
    assert!(String::from_utf8_lossy(&orders.stdout).contains("2024-03-10"));

    assert_success(&run_machete(&root, &["order", "summary"]));
    assert_success(&run_machete(&root, &["activity", "list"]));

    let _ = std::fs::remove_dir_all(root);
}
