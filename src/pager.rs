//! Paginated reads over an organized comment directory.
//!
//! Loads `index.json` once, then serves `(shortcode, page, page_size)` requests
//! by reading only the chunks that overlap the requested id range. Chunks are
//! cached by `(shortcode, chunk_index)`.
//!
//! Page slices are taken with absolute offsets (`start` minus the first loaded
//! chunk's starting offset), so any page size works with any chunk size.

use crate::chunk::{read_chunk, ChunkDescriptor, PostDescriptor};
use crate::index::CommentIndex;
use crate::paths::resolve_rel;
use ahash::AHashMap;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub comments: Vec<String>,
    pub total: usize,
    pub has_more: bool,
}

pub struct ChunkPager {
    root: PathBuf,
    index: CommentIndex,
    cache: AHashMap<(String, usize), Vec<String>>,
}

impl ChunkPager {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let index = CommentIndex::load(&root)?;
        tracing::info!(posts = index.stats.total_posts, comments = index.stats.total_comments, "Loaded comment index");
        Ok(Self { root, index, cache: AHashMap::new() })
    }

    pub fn index(&self) -> &CommentIndex { &self.index }

    pub fn posts(&self) -> impl Iterator<Item = &str> { self.index.posts.keys().map(String::as_str) }

    pub fn post_count(&self, shortcode: &str) -> usize {
        self.index.posts.get(shortcode).map(|d| d.total_comments).unwrap_or(0)
    }

    /// Number of chunks currently held in memory.
    pub fn cached_chunks(&self) -> usize { self.cache.len() }

    /// 1-based `page` of `page_size` ids. Unknown posts, page 0 and page size 0
    /// give an empty page.
    pub fn page(&mut self, shortcode: &str, page: usize, page_size: usize) -> Result<Page> {
        let Some(desc) = self.index.posts.get(shortcode).cloned() else {
            return Ok(Page::default());
        };
        let total = desc.total_comments;
        if page == 0 || page_size == 0 {
            return Ok(Page { comments: Vec::new(), total, has_more: false });
        }
        let start = (page - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);

        let mut window: Vec<String> = Vec::new();
        let mut window_start: Option<usize> = None;
        for (offset, chunk) in overlapping_chunks(&desc, start, end) {
            window_start.get_or_insert(offset);
            let ids = self.load_chunk(shortcode, chunk.index, &chunk.file, chunk.count)?;
            window.extend_from_slice(ids);
        }

        let comments = match window_start {
            Some(ws) => {
                let lo = (start - ws).min(window.len());
                let hi = (end - ws).min(window.len());
                window[lo..hi].to_vec()
            }
            None => Vec::new(),
        };
        Ok(Page { comments, total, has_more: end < total })
    }

    fn load_chunk(&mut self, shortcode: &str, chunk_index: usize, rel: &str, expected: usize) -> Result<&[String]> {
        let key = (shortcode.to_string(), chunk_index);
        if !self.cache.contains_key(&key) {
            let path = resolve_rel(&self.root, rel);
            let chunk = read_chunk(&path)?;
            if chunk.comment_ids.len() != expected {
                bail!(
                    "chunk {} holds {} ids but the index records {}",
                    path.display(),
                    chunk.comment_ids.len(),
                    expected
                );
            }
            self.cache.insert(key.clone(), chunk.comment_ids);
        }
        Ok(self.cache.get(&key).map(Vec::as_slice).unwrap_or(&[]))
    }
}

/// Chunks whose cumulative `[offset, offset + count)` range meets `[start, end)`,
/// paired with their starting offset.
fn overlapping_chunks(desc: &PostDescriptor, start: usize, end: usize) -> Vec<(usize, ChunkDescriptor)> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    for chunk in &desc.chunks {
        let chunk_end = offset + chunk.count;
        if offset < end && chunk_end > start {
            out.push((offset, chunk.clone()));
        }
        offset = chunk_end;
    }
    out
}
