use std::path::Path;

use assert_cmd::Command;
use gymdash::gateway::PersistenceGateway;
use gymdash::models::{NewHistoryRecord, WorkoutTemplate};
use gymdash::store::SqliteGateway;

/// The non-interactive commands, run against an isolated HOME so the real
/// config and state directories are never touched.
fn gymdash(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gymdash").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("GYMDASH_LOG");
    cmd
}

fn seed_history(db: &Path, user_id: &str, names: &[&str]) {
    let gateway = SqliteGateway::open(db).unwrap();
    for name in names {
        let template = WorkoutTemplate {
            id: format!("tpl-{name}"),
            user_id: user_id.into(),
            name: (*name).into(),
            muscle_group: "Back".into(),
            duration_label: "30 min".into(),
            exercises: Vec::new(),
            created_at: chrono::Utc::now(),
        };
        gateway
            .create_history_record(
                user_id,
                NewHistoryRecord::from_template(&template, "30:12".into()),
            )
            .unwrap();
    }
}

#[test]
fn list_exercises_prints_catalog() {
    let home = tempfile::tempdir().unwrap();
    let out = gymdash(home.path())
        .args(["--list-exercises", "--muscle-group", "cardio"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(out).unwrap();
    assert!(!text.is_empty());
    assert!(text.lines().all(|l| l.contains("Cardio")));
}

#[test]
fn export_history_to_file() {
    let home = tempfile::tempdir().unwrap();
    let db = home.path().join("gym.db");
    let csv_path = home.path().join("out.csv");
    seed_history(&db, "m7", &["Pull A", "Pull B"]);
    seed_history(&db, "someone-else", &["Legs"]);

    gymdash(home.path())
        .arg("--user")
        .arg("m7")
        .arg("--db")
        .arg(&db)
        .arg("--export-history")
        .arg(&csv_path)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "completed_at,workout,muscle_group,duration,exercises");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Pull B,Back,30:12,0"));
    assert!(!csv.contains("Legs"));
}

#[test]
fn export_history_needs_a_member() {
    let home = tempfile::tempdir().unwrap();
    let db = home.path().join("gym.db");

    gymdash(home.path())
        .arg("--db")
        .arg(&db)
        .args(["--export-history", "-"])
        .assert()
        .failure();
}

#[test]
fn remember_then_logout_round_trips_config() {
    let home = tempfile::tempdir().unwrap();
    let db = home.path().join("gym.db");
    seed_history(&db, "m9", &["Core"]);

    gymdash(home.path())
        .args(["--user", "m9", "--name", "Kai", "--remember", "--list-exercises"])
        .assert()
        .success();

    // the stored member is used without --user
    let out = gymdash(home.path())
        .arg("--db")
        .arg(&db)
        .args(["--export-history", "-"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("Core,Back,30:12"));

    gymdash(home.path()).arg("--logout").assert().success();
    gymdash(home.path())
        .arg("--db")
        .arg(&db)
        .args(["--export-history", "-"])
        .assert()
        .failure();
}

