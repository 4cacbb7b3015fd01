//! Engagement indexing over a flat comment export.
//!
//! Input: a JSON array of records
//! `{video_id, comment_id, text, author_display_name, like_count, published_at, published_at_timestamp, ...}`.
//! Outputs (all compact, UTF-8):
//!   - `video_comments_index.json`: video → comments sorted by likes desc, then timestamp desc
//!   - `search_index.json`: comment id → lower-cased word list + display fields
//!   - `word_freq_index.json`: video → word cloud + liked words

use crate::paths::{SEARCH_INDEX_FILE, VIDEO_COMMENTS_INDEX_FILE, WORD_FREQ_INDEX_FILE};
use crate::util::write_json_atomic;
use crate::words::{liked_words, word_cloud, WordProfile};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

fn zero() -> Number {
    Number::from(0)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub video_id: String,
    pub comment_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author_display_name: Option<String>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default = "zero")]
    pub published_at_timestamp: Number,
    /// Any other exported columns, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngagementRecord {
    pub fn text(&self) -> &str { self.text.as_deref().unwrap_or("") }
    pub fn author(&self) -> &str { self.author_display_name.as_deref().unwrap_or("") }
    pub fn likes(&self) -> i64 { self.like_count.unwrap_or(0) }
    pub fn timestamp(&self) -> f64 { self.published_at_timestamp.as_f64().unwrap_or(0.0) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub words: Vec<String>,
    pub text: String,
    pub author: String,
    pub video_id: String,
    pub like_count: i64,
    pub published_at: String,
    pub published_at_timestamp: Number,
}

impl SearchEntry {
    pub fn from_record(r: &EngagementRecord) -> Self {
        let searchable = format!("{} {}", r.text(), r.author()).to_lowercase();
        SearchEntry {
            words: searchable.split_whitespace().map(str::to_string).collect(),
            text: r.text().to_string(),
            author: r.author().to_string(),
            video_id: r.video_id.clone(),
            like_count: r.likes(),
            published_at: r.published_at.clone().unwrap_or_default(),
            published_at_timestamp: r.published_at_timestamp.clone(),
        }
    }
}

/// Load the flat export. A missing file is fatal.
pub fn load_records(path: &Path) -> Result<Vec<EngagementRecord>> {
    if !path.is_file() {
        bail!("engagement export not found: {}", path.display());
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("decode engagement records {}", path.display()))
}

/// Group by video (first-seen order).
pub fn group_by_video(records: &[EngagementRecord]) -> IndexMap<String, Vec<&EngagementRecord>> {
    let mut groups: IndexMap<String, Vec<&EngagementRecord>> = IndexMap::new();
    for r in records {
        groups.entry(r.video_id.clone()).or_default().push(r);
    }
    groups
}

/// Video → its comments, most liked first, newer first among equal likes.
/// Fully equal keys keep input order.
pub fn build_video_index(records: &[EngagementRecord]) -> IndexMap<String, Vec<&EngagementRecord>> {
    let mut groups = group_by_video(records);
    for list in groups.values_mut() {
        list.sort_by(|a, b| b.likes().cmp(&a.likes()).then_with(|| b.timestamp().total_cmp(&a.timestamp())));
    }
    groups
}

/// Comment id → search entry. A repeated id keeps its first position and the last record.
pub fn build_search_index(records: &[EngagementRecord]) -> IndexMap<String, SearchEntry> {
    records
        .iter()
        .map(|r| (r.comment_id.clone(), SearchEntry::from_record(r)))
        .collect()
}

pub fn build_word_freq_index(records: &[EngagementRecord], top_words: usize, top_liked: usize) -> IndexMap<String, WordProfile> {
    group_by_video(records)
        .into_iter()
        .map(|(video_id, list)| {
            let profile = WordProfile {
                word_cloud: word_cloud(list.iter().map(|r| r.text()), top_words),
                liked_words: liked_words(list.iter().map(|r| (r.text(), r.likes())), top_liked),
            };
            (video_id, profile)
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EngagementReport {
    pub videos: usize,
    pub comments: usize,
    pub search_entries: usize,
    pub video_index_bytes: u64,
    pub search_index_bytes: u64,
    pub word_freq_bytes: u64,
}

/// Build all three indexes and write them into `out_dir`.
pub fn write_engagement_indexes(
    records: &[EngagementRecord],
    out_dir: &Path,
    top_words: usize,
    top_liked: usize,
    write_buf: usize,
) -> Result<EngagementReport> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    tracing::info!("Creating video-comment index");
    let video_index = build_video_index(records);
    tracing::info!("Creating search index");
    let search_index = build_search_index(records);
    tracing::info!("Creating word frequency index");
    let word_freq = build_word_freq_index(records, top_words, top_liked);

    let video_path = out_dir.join(VIDEO_COMMENTS_INDEX_FILE);
    let search_path = out_dir.join(SEARCH_INDEX_FILE);
    let words_path = out_dir.join(WORD_FREQ_INDEX_FILE);
    write_json_atomic(&video_path, &video_index, false, write_buf)?;
    write_json_atomic(&search_path, &search_index, false, write_buf)?;
    write_json_atomic(&words_path, &word_freq, false, write_buf)?;

    let size = |p: &Path| fs::metadata(p).map(|m| m.len()).unwrap_or(0);
    Ok(EngagementReport {
        videos: video_index.len(),
        comments: records.len(),
        search_entries: search_index.len(),
        video_index_bytes: size(&video_path),
        search_index_bytes: size(&search_path),
        word_freq_bytes: size(&words_path),
    })
}
