use std::fs;
use std::path::Path;

use assert_cmd::Command;
use flashdeck::{
    history::{HistoryStore, SessionSummary},
    store::{KvStore, SqliteBackend},
};
use tempfile::tempdir;

fn flashdeck(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flashdeck").unwrap();
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn list_prints_bundled_technologies() {
    let home = tempdir().unwrap();
    let out = flashdeck(home.path())
        .args(["--no-persist", "--list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("all"));
    assert!(text.contains("react"));
    assert!(text.contains("TypeScript"));
}

#[test]
fn history_without_store_reports_nothing() {
    let home = tempdir().unwrap();
    flashdeck(home.path())
        .args(["--no-persist", "--history"])
        .assert()
        .success()
        .stdout("no sessions recorded\n");
}

#[test]
fn missing_deck_file_fails() {
    let home = tempdir().unwrap();
    flashdeck(home.path())
        .args(["--no-persist", "--list", "--deck"])
        .arg(home.path().join("nope.json"))
        .assert()
        .failure();
}

#[test]
fn export_history_writes_only_the_header_when_empty() {
    let home = tempdir().unwrap();
    let out = home.path().join("history.csv");
    flashdeck(home.path())
        .args(["--no-persist", "--export-history"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "date,cardsStudied,accuracy,timeSpent\n"
    );
}

fn seed_history(home: &Path, summaries: Vec<SessionSummary>) {
    let db = home
        .join(".local")
        .join("state")
        .join("flashdeck")
        .join("store.db");
    let backend = SqliteBackend::open(db).unwrap();
    let history = HistoryStore::new(KvStore::new(Box::new(backend)));
    for summary in summaries {
        history.save_session_stats(summary);
    }
}

fn two_sessions() -> Vec<SessionSummary> {
    vec![
        SessionSummary {
            date: "2026-03-01T09:00:00Z".into(),
            cards_studied: 4,
            accuracy: 75,
            time_spent: 63,
        },
        SessionSummary {
            date: "2026-03-02T09:00:00Z".into(),
            cards_studied: 12,
            accuracy: 100,
            time_spent: 600,
        },
    ]
}

#[test]
fn history_prints_stored_sessions_newest_first() {
    let home = tempdir().unwrap();
    seed_history(home.path(), two_sessions());
    let expected = "2026-03-02T09:00:00Z   12 cards  100% acc  10:00\n\
                    2026-03-01T09:00:00Z    4 cards   75% acc  1:03\n";

    flashdeck(home.path())
        .arg("--history")
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn export_history_writes_stored_sessions() {
    let home = tempdir().unwrap();
    seed_history(home.path(), two_sessions());
    let out = home.path().join("history.csv");

    flashdeck(home.path())
        .arg("--export-history")
        .arg(&out)
        .assert()
        .success();
    let expected = "date,cardsStudied,accuracy,timeSpent\n\
                    2026-03-01T09:00:00Z,4,75,63\n\
                    2026-03-02T09:00:00Z,12,100,600\n";
    assert_eq!(fs::read_to_string(&out).unwrap(), expected);
}

#[test]
fn clear_history_empties_the_store() {
    let home = tempdir().unwrap();
    seed_history(home.path(), two_sessions());

    flashdeck(home.path())
        .arg("--clear-history")
        .assert()
        .success();
    flashdeck(home.path())
        .arg("--history")
        .assert()
        .success()
        .stdout("no sessions recorded\n");
}
