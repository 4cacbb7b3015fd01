use crate::aggregate::PostCommentSet;
use crate::chunk::{write_post_chunks, PostDescriptor};
use crate::paths::{INDEX_FILE, SUMMARY_FILE};
use crate::progress::ProgressScope;
use crate::util::write_json_atomic;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_posts: usize,
    pub total_comments: usize,
    pub total_chunks: usize,
}

/// Contents of `index.json`: every chunked post, in aggregation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommentIndex {
    pub posts: IndexMap<String, PostDescriptor>,
    pub stats: RunStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub shortcode: String,
    pub comment_count: usize,
}

/// Contents of `summary.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Summary {
    pub posts: Vec<SummaryEntry>,
    pub stats: RunStats,
}

impl CommentIndex {
    pub fn insert(&mut self, shortcode: &str, desc: PostDescriptor) {
        self.stats.total_comments += desc.total_comments;
        self.stats.total_chunks += desc.chunk_count;
        self.posts.insert(shortcode.to_string(), desc);
        self.stats.total_posts = self.posts.len();
    }

    /// Posts by descending comment count; equal counts keep index order.
    pub fn summary(&self) -> Summary {
        let mut posts: Vec<SummaryEntry> = self
            .posts
            .iter()
            .map(|(code, d)| SummaryEntry { shortcode: code.to_string(), comment_count: d.total_comments })
            .collect();
        posts.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
        Summary { posts, stats: self.stats }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(INDEX_FILE);
        let bytes = fs::read(&path).with_context(|| format!("read comment index {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("decode comment index {}", path.display()))
    }
}

/// Chunk every non-empty post below `root`. A post whose chunks fail to write
/// is reported and left out; the rest continue.
pub fn build_index(root: &Path, posts: &PostCommentSet, chunk_size: usize, write_buf: usize, pb: Option<&ProgressScope>) -> CommentIndex {
    let mut index = CommentIndex::default();
    let mut failed = 0usize;
    for (code, ids) in posts.iter() {
        if let Some(pb) = pb { pb.inc_items(1); }
        if ids.is_empty() {
            continue;
        }
        match write_post_chunks(root, code, ids, chunk_size, write_buf) {
            Ok(desc) => index.insert(code, desc),
            Err(e) => {
                failed += 1;
                tracing::error!(shortcode = %code, error = %format!("{e:#}"), "Failed to write chunks; post left out of index");
            }
        }
        if index.posts.len() % 100 == 0 && posts.len() > 100 {
            tracing::debug!(posts = index.posts.len(), "Chunked posts so far");
        }
    }
    tracing::info!(
        chunks = index.stats.total_chunks,
        posts = index.stats.total_posts,
        comments = index.stats.total_comments,
        failed_posts = failed,
        "Created chunk files"
    );
    index
}

/// Write `index.json` and `summary.json` (both compact) into `root`.
pub fn write_index_files(root: &Path, index: &CommentIndex, write_buf: usize) -> Result<Summary> {
    write_json_atomic(&root.join(INDEX_FILE), index, false, write_buf)?;
    let summary = index.summary();
    write_json_atomic(&root.join(SUMMARY_FILE), &summary, false, write_buf)?;
    tracing::info!(posts = summary.posts.len(), "Created index files");
    Ok(summary)
}
