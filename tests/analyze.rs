#[path = "common/mod.rs"]
mod common;

use archidx::{load_post_metadata, ArchiveETL};
use common::*;
use serde_json::json;
use std::fs;

#[test]
fn statistics_over_the_log_directory() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("stats");

    let report = ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).analyze_comments(None).unwrap();

    assert_eq!(report.posts_with_comments, 2);
    assert_eq!(report.total_comment_ids, 10);
    // x1 appears twice; everything else once.
    assert_eq!(report.unique_comments, 9);
    assert_eq!(report.duplicate_comments, 1);
    assert_eq!(report.top_commented_posts, vec![("ABC123".to_string(), 7), ("XYZ".to_string(), 2)]);
    assert_eq!(report.total_posts_in_metadata, None);
    assert_eq!(report.missing_posts, None);

    // broken.json contributes nothing.
    let names: Vec<&str> = report.files.iter().map(|f| f.file.as_str()).collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
    assert_eq!((report.files[0].entries, report.files[0].error_entries), (4, 1));
    assert_eq!(report.files[0].comment_ids, 6);
    // EMPTY has no `storedIds` list, so b.json names only ABC123.
    assert_eq!(report.files[1].unique_shortcodes, 1);

    let stats = read_json(&out.join("comment_statistics.json"));
    assert_eq!(stats["top_commented_posts"][0], json!(["ABC123", 7]));
    assert!(stats.get("missing").is_none());
    assert!(fs::read_to_string(out.join("comment_statistics.json")).unwrap().contains('\n'));
    assert!(!out.join("missing_comment_posts.txt").exists());
}

/// Metadata export: several columns, a quoted caption with commas and a
/// newline, padded and blank shortcodes, and a short row.
const METADATA_CSV: &str = "\
Post ID,Shortcode,Caption,Likes
1,ABC123,\"Celery, juice, and more\nsecond line\",10
2,  MISSING1 ,plain,3
3,,no shortcode,0
4,AAA,\"She said \"\"hi\"\"\",7
5
";

#[test]
fn metadata_csv_is_read_by_shortcode_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata.csv");
    fs::write(&path, METADATA_CSV).unwrap();

    let codes = load_post_metadata(&path).unwrap();
    let mut codes: Vec<String> = codes.into_iter().collect();
    codes.sort();
    assert_eq!(codes, vec!["AAA", "ABC123", "MISSING1"]);

    fs::write(&path, "Post ID,Caption\n1,hello\n").unwrap();
    let err = load_post_metadata(&path).unwrap_err();
    assert!(err.to_string().contains("Shortcode"));
}

#[test]
fn metadata_reports_missing_and_extra() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("stats");
    let known = dir.path().join("metadata.csv");
    fs::write(&known, METADATA_CSV).unwrap();

    let report = ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(&out)
        .progress(false)
        .analyze_comments(Some(&known))
        .unwrap();

    assert_eq!(report.total_posts_in_metadata, Some(3));
    assert_eq!(report.missing_posts, Some(2));
    assert_eq!(report.extra_posts, Some(1));
    assert_eq!(report.missing, vec!["AAA", "MISSING1"]);

    let listed = fs::read_to_string(out.join("missing_comment_posts.txt")).unwrap();
    assert_eq!(listed, "AAA\nMISSING1\n");
}

#[test]
fn missing_metadata_file_is_fatal() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("stats");
    let err = ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(&out)
        .progress(false)
        .analyze_comments(Some(&dir.path().join("absent.csv")))
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(!out.join("comment_statistics.json").exists());
}

/// The same id under one post in two files counts once per file toward the
/// post, but as one duplicate overall.
#[test]
fn per_post_counts_sum_per_file_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("comments");
    write_json(&logs.join("1.json"), &json!({ "a": log_entry("P", &[&["x", "x", "y"]]) }));
    write_json(&logs.join("2.json"), &json!({ "b": log_entry("P", &[&["x"]]) }));

    let report = ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(dir.path().join("stats"))
        .progress(false)
        .analyze_comments(None)
        .unwrap();
    assert_eq!(report.top_commented_posts, vec![("P".to_string(), 3)]);
    assert_eq!(report.total_comment_ids, 4);
    assert_eq!(report.unique_comments, 2);
    assert_eq!(report.duplicate_comments, 1);
}

/// An empty `storedIds` list makes the post count in the per-file and the
/// overall figures alike; an entry without one counts in neither.
#[test]
fn listed_posts_count_the_same_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("comments");
    write_json(
        &logs.join("1.json"),
        &json!({
            "a": log_entry("P", &[&["x"]]),
            "b": { "target": "HOLLOW", "logs": [{ "storedIds": [] }] },
            "c": { "target": "BARE", "logs": [] },
        }),
    );
    let known = dir.path().join("metadata.csv");
    fs::write(&known, "Shortcode\nP\nHOLLOW\nBARE\n").unwrap();

    let report = ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(dir.path().join("stats"))
        .progress(false)
        .analyze_comments(Some(&known))
        .unwrap();
    assert_eq!(report.files[0].unique_shortcodes, 2);
    assert_eq!(report.posts_with_comments, 2);
    assert_eq!(report.top_commented_posts, vec![("P".to_string(), 1), ("HOLLOW".to_string(), 0)]);
    assert_eq!(report.missing, vec!["BARE"]);
    assert_eq!(report.extra_posts, Some(0));
}
