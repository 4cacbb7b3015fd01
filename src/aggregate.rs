//! Ingestion & aggregation of comment-log files.
//!
//! Every file parses into an isolated [`FileResult`]; results combine through
//! [`FileResult::merge`], which is associative, so the overall mapping is a
//! pure fold over per-file results in file order.

use crate::concurrency::map_files_limited;
use crate::entry::{document_entries, parse_entry, EntryOutcome};
use crate::paths::display_name;
use crate::progress::ProgressScope;
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Post shortcode → comment ids in encounter order (duplicates kept).
pub type PostCommentSet = IndexMap<String, Vec<String>>;

/// Counters reported while ingesting. Observational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub files: u64,
    pub failed_files: u64,
    pub entries: u64,
    pub processed: u64,
    pub untargeted: u64,
    pub error_entries: u64,
}

impl IngestStats {
    fn add(&mut self, o: &IngestStats) {
        self.files += o.files;
        self.failed_files += o.failed_files;
        self.entries += o.entries;
        self.processed += o.processed;
        self.untargeted += o.untargeted;
        self.error_entries += o.error_entries;
    }
}

#[derive(Clone, Debug, Default)]
pub struct FileResult {
    pub posts: PostCommentSet,
    pub stats: IngestStats,
}

impl FileResult {
    /// Parse an already-decoded document. `None` if the top level is neither
    /// an object nor an array.
    pub fn from_document(doc: Value) -> Option<Self> {
        let entries = document_entries(doc)?;
        let mut out = FileResult::default();
        out.stats.files = 1;
        for (key, v) in entries {
            out.stats.entries += 1;
            match parse_entry(&v) {
                EntryOutcome::Valid(entry) => {
                    out.stats.processed += 1;
                    // A post is known once any `storedIds` list names it, even an empty one.
                    if entry.id_lists > 0 {
                        out.posts.entry(entry.target).or_default().extend(entry.stored_ids);
                    }
                }
                EntryOutcome::Untargeted => out.stats.untargeted += 1,
                EntryOutcome::Rejected(reason) => {
                    out.stats.error_entries += 1;
                    tracing::debug!(key = %key, %reason, "Skipping malformed entry");
                }
            }
        }
        Some(out)
    }

    /// Result standing in for a file that could not be read or decoded.
    pub fn failed() -> Self {
        let mut out = FileResult::default();
        out.stats.failed_files = 1;
        out
    }

    /// Append `other` after `self`: its posts extend (or follow) ours.
    pub fn merge(&mut self, other: FileResult) {
        self.stats.add(&other.stats);
        for (code, ids) in other.posts {
            self.posts.entry(code).or_default().extend(ids);
        }
    }

    /// Total comment references (duplicates included).
    pub fn total_refs(&self) -> usize {
        self.posts.values().map(Vec::len).sum()
    }
}

/// Read and parse one log file. Errors for unreadable files, invalid JSON,
/// or an unexpected top-level shape.
pub fn parse_file(path: &Path) -> Result<FileResult> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let doc: Value = serde_json::from_slice(&bytes).with_context(|| format!("decode JSON {}", path.display()))?;
    match FileResult::from_document(doc) {
        Some(r) => Ok(r),
        None => bail!("unexpected top-level JSON type in {}", path.display()),
    }
}

/// Fold per-file results, in order, into one mapping.
pub fn aggregate<I: IntoIterator<Item = FileResult>>(parts: I) -> FileResult {
    parts.into_iter().fold(FileResult::default(), |mut acc, part| {
        acc.merge(part);
        acc
    })
}

/// Parse every file (at most `file_concurrency` at a time), reporting and
/// skipping the ones that fail. Output order matches `files`.
pub fn ingest_files(files: &[PathBuf], file_concurrency: usize, pb: Option<&ProgressScope>) -> Vec<(PathBuf, FileResult)> {
    map_files_limited(files, file_concurrency, |path| {
        let res = match parse_file(path) {
            Ok(r) => {
                tracing::info!(
                    file = %display_name(path),
                    entries = r.stats.entries,
                    processed = r.stats.processed,
                    error_entries = r.stats.error_entries,
                    posts = r.posts.len(),
                    "Processed comment log"
                );
                r
            }
            Err(e) => {
                tracing::warn!(file = %display_name(path), error = %format!("{e:#}"), "Skipping unreadable comment log");
                FileResult::failed()
            }
        };
        if let Some(pb) = pb { pb.inc_items(1); }
        (path.clone(), res)
    })
}
