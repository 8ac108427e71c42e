use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use glimpse::db::Database;

fn create_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("captures.sqlite3");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE frames (id INTEGER PRIMARY KEY, timestamp TEXT NOT NULL);
         CREATE TABLE allText (frameId INTEGER NOT NULL, text TEXT, lid TEXT);",
    )
    .unwrap();
    path
}

/// Inserts one capture `age_secs` in the past; negative ages land in the
/// future.
fn insert_capture(path: &Path, frame_id: i64, age_secs: i64, text: &str) {
    let conn = Connection::open(path).unwrap();
    let timestamp = (Utc::now() - Duration::seconds(age_secs)).to_rfc3339();
    conn.execute(
        "INSERT INTO frames (id, timestamp) VALUES (?1, ?2)",
        params![frame_id, timestamp],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO allText (frameId, text, lid) VALUES (?1, ?2, 'en')",
        params![frame_id, text],
    )
    .unwrap();
}

#[tokio::test]
async fn fetch_respects_interval_bound() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    insert_capture(&path, 1, 5, "recent text");
    insert_capture(&path, 2, 200, "old text");

    let db = Database::open(path).unwrap();

    let recent = db.fetch_recent_captures(60).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].frame_id, 1);
    assert_eq!(recent[0].text, "recent text");
    assert_eq!(recent[0].language_id, "en");

    let wide = db.fetch_recent_captures(300).await.unwrap();
    assert_eq!(wide.len(), 2);
}

#[tokio::test]
async fn fetch_orders_newest_first() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    insert_capture(&path, 1, 30, "oldest");
    insert_capture(&path, 2, 10, "newest");
    insert_capture(&path, 3, 20, "middle");

    let db = Database::open(path).unwrap();
    let records = db.fetch_recent_captures(60).await.unwrap();

    let ids: Vec<i64> = records.iter().map(|r| r.frame_id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[tokio::test]
async fn fetch_excludes_future_timestamps() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    insert_capture(&path, 1, -3600, "from the future");
    insert_capture(&path, 2, 5, "from the past");

    let db = Database::open(path).unwrap();
    let records = db.fetch_recent_captures(7200).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].frame_id, 2);
}

#[tokio::test]
async fn fetch_skips_rows_with_unreadable_timestamps() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    insert_capture(&path, 1, 5, "good row");
    {
        let conn = Connection::open(&path).unwrap();
        // SQLite's date functions accept the literal 'now', so this row
        // passes the window filter but its timestamp text is unparseable.
        conn.execute("INSERT INTO frames (id, timestamp) VALUES (2, 'now')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO allText (frameId, text, lid) VALUES (2, 'bad row', 'en')",
            [],
        )
        .unwrap();
    }

    let db = Database::open(path).unwrap();
    let records = db.fetch_recent_captures(60).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "good row");
}

#[tokio::test]
async fn empty_interval_returns_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = create_store(&dir);
    insert_capture(&path, 1, 120, "too old for a tight window");

    let db = Database::open(path).unwrap();
    let records = db.fetch_recent_captures(15).await.unwrap();
    assert!(records.is_empty());
}

#[test]
fn open_fails_for_missing_store() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.sqlite3");
    assert!(Database::open(missing).is_err());
}

#[tokio::test]
async fn fetch_fails_when_schema_is_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.sqlite3");
    // A store file with none of the capture tables.
    Connection::open(&path).unwrap();

    let db = Database::open(path).unwrap();
    assert!(db.fetch_recent_captures(60).await.is_err());
}
