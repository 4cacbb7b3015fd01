//! Chunked persistence of a post's deduplicated comment ids.
//!
//! File layout under the output root:
//!   posts/<shortcode>/chunk_<n>.json   `{shortcode, chunk_index, comment_ids, count}`
//!
//! Chunk indices are dense from 0; every chunk holds `chunk_size` ids except
//! possibly the last.

use crate::paths::{chunk_rel_path, resolve_rel, POSTS_DIR};
use crate::util::{is_single_component, write_json_atomic};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub shortcode: String,
    pub chunk_index: usize,
    pub comment_ids: Vec<String>,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub count: usize,
    /// Location relative to the output root, `/`-separated.
    pub file: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDescriptor {
    pub total_comments: usize,
    pub chunks: Vec<ChunkDescriptor>,
    pub chunk_count: usize,
}

/// Split `ids` into `(chunk_index, slice)` pairs of at most `chunk_size`.
pub fn plan_chunks(ids: &[String], chunk_size: usize) -> impl Iterator<Item = (usize, &[String])> {
    ids.chunks(chunk_size.max(1)).enumerate()
}

/// Write all chunks of one post below `root` and describe them.
/// `ids` must be non-empty; an empty post has no chunks and no descriptor.
pub fn write_post_chunks(root: &Path, shortcode: &str, ids: &[String], chunk_size: usize, write_buf: usize) -> Result<PostDescriptor> {
    if ids.is_empty() {
        bail!("post {shortcode} has no comments to chunk");
    }
    if !is_single_component(shortcode) {
        bail!("shortcode {shortcode:?} is not usable as a directory name");
    }
    let post_dir = root.join(POSTS_DIR).join(shortcode);
    fs::create_dir_all(&post_dir).with_context(|| format!("create {}", post_dir.display()))?;

    let mut chunks = Vec::with_capacity(ids.len().div_ceil(chunk_size.max(1)));
    for (chunk_index, slice) in plan_chunks(ids, chunk_size) {
        let rel = chunk_rel_path(shortcode, chunk_index);
        let chunk = Chunk {
            shortcode: shortcode.to_string(),
            chunk_index,
            comment_ids: slice.to_vec(),
            count: slice.len(),
        };
        write_json_atomic(&resolve_rel(root, &rel), &chunk, false, write_buf)?;
        chunks.push(ChunkDescriptor { index: chunk_index, count: slice.len(), file: rel });
    }

    Ok(PostDescriptor { total_comments: ids.len(), chunk_count: chunks.len(), chunks })
}

/// Read a chunk artifact back.
pub fn read_chunk(path: &Path) -> Result<Chunk> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("decode chunk {}", path.display()))
}
