//! Archive analysis: how much comment data the log directory holds, how much of
//! it is duplicated, and (optionally) which posts in the archive's metadata
//! export have no comments at all.
//!
//! A post counts as having comments once any `storedIds` list names it, in
//! both the per-file and the overall figures.

use crate::aggregate::FileResult;
use crate::dedupe::dedupe_ordered;
use crate::paths::{display_name, MISSING_POSTS_FILE, STATISTICS_FILE};
use crate::util::write_json_atomic;
use ahash::{AHashMap, AHashSet};
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TOP_COMMENTED: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub file: String,
    pub entries: u64,
    pub error_entries: u64,
    pub unique_shortcodes: usize,
    pub comment_ids: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub total_posts_in_metadata: Option<usize>,
    pub posts_with_comments: usize,
    pub total_comment_ids: usize,
    pub unique_comments: usize,
    pub duplicate_comments: usize,
    pub missing_posts: Option<usize>,
    pub extra_posts: Option<usize>,
    /// `(shortcode, count)`; per-file unique counts summed across files.
    pub top_commented_posts: Vec<(String, usize)>,
    pub files: Vec<FileStats>,
    #[serde(skip)]
    pub missing: Vec<String>,
}

pub const SHORTCODE_COLUMN: &str = "Shortcode";

/// Post shortcodes from the archive's metadata CSV (`Shortcode` column,
/// trimmed, blanks skipped). A configured but absent file is fatal.
pub fn load_post_metadata(path: &Path) -> Result<AHashSet<String>> {
    if !path.is_file() {
        return Err(anyhow!("post metadata not found: {}", path.display()));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let column = rdr
        .headers()
        .with_context(|| format!("read CSV header {}", path.display()))?
        .iter()
        .position(|h| h.trim() == SHORTCODE_COLUMN)
        .ok_or_else(|| anyhow!("no {SHORTCODE_COLUMN} column in {}", path.display()))?;

    let mut shortcodes = AHashSet::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("read CSV row {} of {}", line + 2, path.display()))?;
        if let Some(code) = record.get(column).map(str::trim).filter(|c| !c.is_empty()) {
            shortcodes.insert(code.to_string());
        }
    }
    tracing::info!(posts = shortcodes.len(), path = %path.display(), "Loaded post metadata");
    Ok(shortcodes)
}

/// Compute the report from per-file results (failed files contribute nothing).
pub fn analyze(files: &[(PathBuf, FileResult)], known: Option<&AHashSet<String>>) -> ArchiveReport {
    let mut report = ArchiveReport::default();
    let mut per_post: IndexMap<String, usize> = IndexMap::new();
    let mut id_counts: AHashMap<&str, u32> = AHashMap::new();

    for (path, res) in files {
        if res.stats.failed_files > 0 {
            continue;
        }
        let mut file_refs = 0usize;
        for (code, ids) in res.posts.iter() {
            file_refs += ids.len();
            for id in ids {
                *id_counts.entry(id.as_str()).or_insert(0) += 1;
            }
            *per_post.entry(code.clone()).or_default() += dedupe_ordered(ids.iter().cloned()).len();
        }
        report.total_comment_ids += file_refs;
        report.files.push(FileStats {
            file: display_name(path),
            entries: res.stats.entries,
            error_entries: res.stats.error_entries,
            unique_shortcodes: res.posts.len(),
            comment_ids: file_refs,
        });
    }

    report.posts_with_comments = per_post.len();
    report.unique_comments = id_counts.len();
    report.duplicate_comments = id_counts.values().filter(|&&n| n > 1).count();

    let mut top: Vec<(String, usize)> = per_post.iter().map(|(k, &v)| (k.clone(), v)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1));
    top.truncate(TOP_COMMENTED);
    report.top_commented_posts = top;

    if let Some(known) = known {
        let mut missing: Vec<String> = known.iter().filter(|k| !per_post.contains_key(k.as_str())).cloned().collect();
        missing.sort();
        let extra = per_post.keys().filter(|k| !known.contains(*k)).count();
        report.total_posts_in_metadata = Some(known.len());
        report.missing_posts = Some(missing.len());
        report.extra_posts = Some(extra);
        report.missing = missing;
    }
    report
}

/// Write `comment_statistics.json` (pretty) and, when posts are missing,
/// `missing_comment_posts.txt`.
pub fn write_report(out_dir: &Path, report: &ArchiveReport, write_buf: usize) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    if !report.missing.is_empty() {
        let path = out_dir.join(MISSING_POSTS_FILE);
        let f = fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(f);
        for code in &report.missing {
            writeln!(w, "{code}")?;
        }
        w.flush()?;
        tracing::info!(count = report.missing.len(), path = %path.display(), "Saved missing posts");
    }
    write_json_atomic(&out_dir.join(STATISTICS_FILE), report, true, write_buf)
}
