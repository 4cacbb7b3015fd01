#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `v` as JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, v: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    f.write_all(serde_json::to_string(v).unwrap().as_bytes()).unwrap();
}

pub fn read_json(path: &Path) -> Value {
    let bytes = fs::read(path).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// One comment-log entry targeting `code`, with one log per id batch.
pub fn log_entry(code: &str, batches: &[&[&str]]) -> Value {
    let logs: Vec<Value> = batches.iter().map(|ids| json!({ "storedIds": ids })).collect();
    json!({ "target": code, "logs": logs })
}

/// Build a small comment-log directory under a fresh temp dir:
/// - `a.json` (object form):
///     u1 → ABC123 [c1, c2, c3]
///     u2 → XYZ    [x1, x2, x1]   (duplicate inside one post)
///     u3 → ""                    (untargeted, ignored)
///     u4 → "garbage"             (not an object → error entry)
/// - `b.json` (array form):
///     ABC123 [c4, c5, c6, c7]; EMPTY with no logs; and an entry whose `logs` is a string
/// - `broken.json`: not JSON at all (skipped)
/// - `._a.json`: macOS resource fork (never read)
/// - `notes.txt`: not JSON by extension (never read)
///
/// Returns the temp dir (keep it alive) and the comment-log directory.
pub fn make_comment_logs() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("comments");

    write_json(
        &logs.join("a.json"),
        &json!({
            "u1": log_entry("ABC123", &[&["c1", "c2"], &["c3"]]),
            "u2": log_entry("XYZ", &[&["x1", "x2", "x1"]]),
            "u3": log_entry("", &[&["lost"]]),
            "u4": "garbage",
        }),
    );
    write_json(
        &logs.join("b.json"),
        &json!([
            log_entry("ABC123", &[&["c4", "c5", "c6", "c7"]]),
            { "target": "EMPTY", "logs": [] },
            { "target": "BAD", "logs": "not-a-list" },
        ]),
    );
    fs::write(logs.join("broken.json"), b"{ this is not json").unwrap();
    fs::write(logs.join("._a.json"), b"\x00\x05\x16\x07").unwrap();
    fs::write(logs.join("notes.txt"), b"hello").unwrap();

    (dir, logs)
}

/// Comment-log directory with a single file holding `posts` as `(code, n_ids)`;
/// ids are `<code>-<i>`.
pub fn make_sized_posts(posts: &[(&str, usize)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("comments");
    let mut doc = serde_json::Map::new();
    for (i, (code, n)) in posts.iter().enumerate() {
        let ids: Vec<String> = (0..*n).map(|k| format!("{code}-{k}")).collect();
        doc.insert(format!("e{i}"), json!({ "target": code, "logs": [{ "storedIds": ids }] }));
    }
    write_json(&logs.join("posts.json"), &Value::Object(doc));
    (dir, logs)
}

/// Engagement export with two videos.
///   v1: e1 (5 likes, t=100), e2 (5 likes, t=200), e3 (0 likes), e4 (9 likes)
///   v2: f1 (1 like)
pub fn engagement_records() -> Value {
    json!([
        { "video_id": "v1", "comment_id": "e1", "text": "Healing celery juice works", "author_display_name": "Ann",
          "like_count": 5, "published_at": "2024-01-01T00:00:00Z", "published_at_timestamp": 100 },
        { "video_id": "v1", "comment_id": "e2", "text": "Celery juice every morning", "author_display_name": "Bob Lee",
          "like_count": 5, "published_at": "2024-01-02T00:00:00Z", "published_at_timestamp": 200, "channel": "mm" },
        { "video_id": "v1", "comment_id": "e3", "text": "The the the and", "author_display_name": "Cy",
          "like_count": 0, "published_at": "2024-01-03T00:00:00Z", "published_at_timestamp": 300 },
        { "video_id": "v1", "comment_id": "e4", "text": "Juice juice juice!", "author_display_name": "Di",
          "like_count": 9, "published_at": "2024-01-04T00:00:00Z", "published_at_timestamp": 50 },
        { "video_id": "v2", "comment_id": "f1", "text": "Thank you", "author_display_name": "Eve",
          "like_count": 1, "published_at": "2024-02-01T00:00:00Z", "published_at_timestamp": 400 },
    ])
}
