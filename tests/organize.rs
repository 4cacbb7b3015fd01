#[path = "common/mod.rs"]
mod common;

use archidx::{dedupe_ordered, plan_chunks, read_chunk, ArchiveETL, CommentIndex, Summary};
use common::*;
use std::fs;

/// End-to-end organize over the mixed fixture directory:
/// - broken.json skipped, resource forks ignored
/// - XYZ deduplicated from 3 to 2
/// - EMPTY (valid entry, no ids) absent from the index
#[test]
fn organize_writes_chunks_index_and_summary() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("organized");

    let report = ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(&out)
        .chunk_size(3)
        .progress(false)
        .organize_comments()
        .unwrap();

    assert_eq!(report.ingest.failed_files, 1);
    assert_eq!(report.ingest.error_entries, 2);

    let index = read_json(&out.join("index.json"));
    let posts = index["posts"].as_object().unwrap();
    assert_eq!(posts.keys().collect::<Vec<_>>(), vec!["ABC123", "XYZ"]);
    assert!(posts.get("EMPTY").is_none(), "zero-comment post must not be indexed");

    let abc = &posts["ABC123"];
    assert_eq!(abc["total_comments"], 7);
    assert_eq!(abc["chunk_count"], 3);
    assert_eq!(abc["chunks"][0]["file"], "posts/ABC123/chunk_0.json");
    assert_eq!(abc["chunks"][2]["count"], 1);

    assert_eq!(index["stats"]["total_posts"], 2);
    assert_eq!(index["stats"]["total_comments"], 9);
    assert_eq!(index["stats"]["total_chunks"], 4);

    let chunk = read_json(&out.join("posts").join("XYZ").join("chunk_0.json"));
    assert_eq!(chunk["shortcode"], "XYZ");
    assert_eq!(chunk["chunk_index"], 0);
    assert_eq!(chunk["comment_ids"], serde_json::json!(["x1", "x2"]));
    assert_eq!(chunk["count"], 2);

    let summary = read_json(&out.join("summary.json"));
    assert_eq!(summary["posts"][0]["shortcode"], "ABC123");
    assert_eq!(summary["posts"][0]["comment_count"], 7);
    assert_eq!(summary["stats"], index["stats"]);

    assert!(!out.join("posts").join("EMPTY").exists());
    assert!(report.total_bytes > 0);
}

/// Artifacts are compact JSON.
#[test]
fn index_files_are_compact() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("organized");
    ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).organize_comments().unwrap();

    let text = fs::read_to_string(out.join("index.json")).unwrap();
    assert!(!text.contains('\n'));
    assert!(!text.contains(": "));
    assert!(text.starts_with(r#"{"posts":{"ABC123":{"total_comments":7,"chunks":[{"index":0,"count":7,"file":"posts/ABC123/chunk_0.json"}],"chunk_count":1}"#));
}

/// Concatenating chunks in index order reproduces the deduplicated list,
/// with ceil(N/C) chunks, for several capacities.
#[test]
fn chunks_partition_the_comment_list() {
    for (n, c) in [(7usize, 3usize), (9, 3), (1, 1000), (2500, 1000), (10, 1)] {
        let (dir, logs) = make_sized_posts(&[("POST", n)]);
        let out = dir.path().join("organized");
        let report = ArchiveETL::new()
            .input_dir(&logs)
            .output_dir(&out)
            .chunk_size(c)
            .progress(false)
            .organize_comments()
            .unwrap();

        let desc = report.index.posts.get("POST").unwrap();
        assert_eq!(desc.chunk_count, n.div_ceil(c), "n={n} c={c}");
        assert_eq!(desc.chunks.iter().map(|d| d.count).sum::<usize>(), n);

        let mut all = Vec::new();
        for (i, d) in desc.chunks.iter().enumerate() {
            assert_eq!(d.index, i);
            let chunk = read_chunk(&out.join(&d.file)).unwrap();
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.count, chunk.comment_ids.len());
            assert!(chunk.count <= c);
            all.extend(chunk.comment_ids);
        }
        let expected: Vec<String> = (0..n).map(|k| format!("POST-{k}")).collect();
        assert_eq!(all, expected);
    }
}

#[test]
fn chunk_plan_sizes() {
    let ids: Vec<String> = (0..7).map(|i| i.to_string()).collect();
    let sizes: Vec<(usize, usize)> = plan_chunks(&ids, 3).map(|(i, s)| (i, s.len())).collect();
    assert_eq!(sizes, vec![(0, 3), (1, 3), (2, 1)]);
    // A zero capacity is treated as one id per chunk.
    assert_eq!(plan_chunks(&ids, 0).count(), 7);
}

/// An empty `storedIds` list names a post but gives it nothing to chunk.
#[test]
fn listed_post_without_ids_is_not_indexed() {
    let (dir, logs) = make_comment_logs();
    write_json(&logs.join("c.json"), &serde_json::json!({ "k": { "target": "HOLLOW", "logs": [{ "storedIds": [] }] } }));
    let out = dir.path().join("organized");
    let report = ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).organize_comments().unwrap();

    assert!(report.index.posts.get("HOLLOW").is_none());
    assert!(!out.join("posts").join("HOLLOW").exists());
    assert_eq!(report.index.stats.total_posts, 2);
}

#[test]
fn deduplication_preserves_first_occurrence_and_is_idempotent() {
    let input: Vec<String> = ["a", "b", "a", "c", "b"].iter().map(|s| s.to_string()).collect();
    let once = dedupe_ordered(input);
    assert_eq!(once, vec!["a", "b", "c"]);
    let twice = dedupe_ordered(once.clone());
    assert_eq!(twice, once);
    assert!(dedupe_ordered(Vec::<String>::new()).is_empty());
}

/// Counts [5, 20, 5, 1] → summary order [20, 5, 5, 1]; the two 5s keep their order.
#[test]
fn summary_sorts_descending_and_stably() {
    let (dir, logs) = make_sized_posts(&[("P1", 5), ("P2", 20), ("P3", 5), ("P4", 1)]);
    let out = dir.path().join("organized");
    ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).organize_comments().unwrap();

    let bytes = fs::read(out.join("summary.json")).unwrap();
    let summary: Summary = serde_json::from_slice(&bytes).unwrap();
    let order: Vec<(&str, usize)> = summary.posts.iter().map(|p| (p.shortcode.as_str(), p.comment_count)).collect();
    assert_eq!(order, vec![("P2", 20), ("P1", 5), ("P3", 5), ("P4", 1)]);
    assert_eq!(summary.stats.total_comments, 31);
}

/// A shortcode that cannot be a directory name is reported and left out;
/// the other posts are still written.
#[test]
fn unwritable_post_does_not_stop_the_run() {
    let (dir, logs) = make_sized_posts(&[("OK1", 2), ("../escape", 3), ("OK2", 1)]);
    let out = dir.path().join("organized");
    let report = ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).organize_comments().unwrap();

    assert_eq!(report.index.posts.keys().collect::<Vec<_>>(), vec!["OK1", "OK2"]);
    assert_eq!(report.index.stats.total_comments, 3);
    assert!(!dir.path().join("escape").exists());
    assert!(out.join("posts").join("OK2").join("chunk_0.json").exists());
}

/// Parallel parsing yields the same index as sequential parsing.
#[test]
fn parallel_and_sequential_runs_agree() {
    let (dir, logs) = make_comment_logs();
    write_json(&logs.join("c.json"), &serde_json::json!({ "k": log_entry("XYZ", &[&["x3", "x1"]]) }));

    let seq_out = dir.path().join("seq");
    let par_out = dir.path().join("par");
    ArchiveETL::new().input_dir(&logs).output_dir(&seq_out).chunk_size(2).progress(false).organize_comments().unwrap();
    ArchiveETL::new()
        .input_dir(&logs)
        .output_dir(&par_out)
        .chunk_size(2)
        .file_concurrency(4)
        .progress(false)
        .organize_comments()
        .unwrap();

    let seq = fs::read_to_string(seq_out.join("index.json")).unwrap();
    let par = fs::read_to_string(par_out.join("index.json")).unwrap();
    assert_eq!(seq.replace("seq", ""), par.replace("par", ""));

    let idx = CommentIndex::load(&seq_out).unwrap();
    assert_eq!(idx.posts.get("XYZ").unwrap().total_comments, 3);
}

/// Output directory is rebuilt from scratch unless cleaning is disabled.
#[test]
fn stale_output_is_removed() {
    let (dir, logs) = make_comment_logs();
    let out = dir.path().join("organized");
    fs::create_dir_all(out.join("posts").join("OLD")).unwrap();
    fs::write(out.join("posts").join("OLD").join("chunk_0.json"), b"{}").unwrap();

    ArchiveETL::new().input_dir(&logs).output_dir(&out).clean_output(false).progress(false).organize_comments().unwrap();
    assert!(out.join("posts").join("OLD").exists());

    ArchiveETL::new().input_dir(&logs).output_dir(&out).progress(false).organize_comments().unwrap();
    assert!(!out.join("posts").join("OLD").exists());
    assert!(out.join("index.json").exists());
}

#[test]
fn missing_input_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArchiveETL::new()
        .input_dir(dir.path().join("nope"))
        .output_dir(dir.path().join("out"))
        .progress(false)
        .organize_comments()
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
