//! Best-effort mapping of downloaded video files to video metadata.
//!
//! Files are expected to be named `YYYYMMDD_<shortcode>_<Title>.mp4`. Each video
//! is scored against every not-yet-matched file: +100 when the upload date
//! matches, then +50 / +30 / +25 for exact / contained / containing titles, or
//! +2 per shared title word. A match needs at least the date.

use crate::paths::display_name;
use crate::util::write_json_atomic;
use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use walkdir::WalkDir;

pub const DATE_SCORE: u32 = 100;
pub const MIN_MATCH_SCORE: u32 = DATE_SCORE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFile {
    pub date: Date,
    pub date_str: String,
    pub shortcode: String,
    /// Title with underscores shown as spaces.
    pub title: String,
    pub filename: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMeta {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMapping {
    pub title: String,
    pub suggested_filename: String,
    pub actual_filename: String,
    pub file_path: String,
    pub match_score: u32,
    pub upload_date: String,
    pub file_date: String,
}

fn filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{8})_([^_]+)_(.+)\.mp4$").unwrap())
}

fn forbidden_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Title as it would likely appear in a file name: forbidden characters
/// removed, `&` spaced out, quotes dropped, whitespace runs joined with `_`.
pub fn sanitize_title(title: &str) -> String {
    let t = forbidden_re().replace_all(title, "");
    let t = t.replace('&', " ").replace(['\'', '"', '*'], "");
    whitespace_re().replace_all(t.trim(), "_").into_owned()
}

pub fn parse_video_filename(filename: &str) -> Option<VideoFile> {
    let caps = filename_re().captures(filename)?;
    let date_str = caps[1].to_string();
    let date = match Date::parse(&date_str, format_description!("[year][month][day]")) {
        Ok(d) => d,
        Err(_) => {
            tracing::warn!(filename, "Invalid date in video filename");
            return None;
        }
    };
    Some(VideoFile {
        date,
        date_str,
        shortcode: caps[2].to_string(),
        title: caps[3].replace('_', " "),
        filename: filename.to_string(),
    })
}

/// `.mp4` files (any case) directly in `dir`, sorted by name. A missing
/// directory yields nothing.
pub fn scan_video_files(dir: &Path) -> Vec<VideoFile> {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "Video downloads folder not found");
        return Vec::new();
    }
    let mut out = Vec::new();
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        if !ent.file_type().is_file() {
            continue;
        }
        let Some(name) = ent.file_name().to_str() else { continue };
        if !name.to_lowercase().ends_with(".mp4") {
            continue;
        }
        match parse_video_filename(name) {
            Some(f) => {
                tracing::debug!(filename = name, "Found video file");
                out.push(f);
            }
            None => tracing::warn!(filename = name, "Couldn't parse video filename"),
        }
    }
    out
}

pub fn load_video_meta(path: &Path) -> Result<Vec<VideoMeta>> {
    if !path.is_file() {
        bail!("video metadata not found: {}", path.display());
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let videos: Vec<VideoMeta> = serde_json::from_slice(&bytes).with_context(|| format!("decode videos {}", path.display()))?;
    tracing::info!(videos = videos.len(), "Loaded video metadata");
    Ok(videos)
}

/// Upload date as `YYYYMMDD`, from an RFC 3339 timestamp or a bare `YYYY-MM-DD` prefix.
pub fn upload_date(published_at: &str) -> Option<String> {
    let date = match OffsetDateTime::parse(published_at, &Rfc3339) {
        Ok(dt) => dt.date(),
        Err(_) => Date::parse(published_at.get(..10)?, format_description!("[year]-[month]-[day]")).ok()?,
    };
    date.format(format_description!("[year][month][day]")).ok()
}

pub fn match_score(video_title: &str, video_date: &str, file: &VideoFile) -> u32 {
    let mut score = 0;
    if file.date_str == video_date {
        score += DATE_SCORE;
    }
    let v = sanitize_title(video_title).to_lowercase();
    let f = sanitize_title(&file.title).to_lowercase();
    if v == f {
        score += 50;
    } else if f.contains(&v) {
        score += 30;
    } else if v.contains(&f) {
        score += 25;
    } else {
        let vw: AHashSet<&str> = v.split('_').collect();
        let fw: AHashSet<&str> = f.split('_').collect();
        score += 2 * vw.intersection(&fw).count() as u32;
    }
    score
}

/// Match every video to at most one file, and every file to at most one video.
/// `file_prefix` is prepended (with `/`) to the stored `file_path`.
pub fn match_videos(videos: &[VideoMeta], files: &[VideoFile], file_prefix: &str) -> IndexMap<String, VideoMapping> {
    let mut mappings = IndexMap::new();
    let mut matched: AHashSet<&str> = AHashSet::new();

    for video in videos {
        let Some(date) = upload_date(&video.published_at) else {
            tracing::warn!(title = %video.title, "Couldn't parse upload date for video");
            continue;
        };

        let mut best: Option<&VideoFile> = None;
        let mut best_score = 0;
        for file in files {
            if matched.contains(file.filename.as_str()) {
                continue;
            }
            let score = match_score(&video.title, &date, file);
            if score > best_score {
                best_score = score;
                best = Some(file);
            }
        }

        match best {
            Some(file) if best_score >= MIN_MATCH_SCORE => {
                matched.insert(file.filename.as_str());
                tracing::info!(title = %video.title, file = %file.filename, score = best_score, "Matched video");
                mappings.insert(
                    video.video_id.clone(),
                    VideoMapping {
                        title: video.title.clone(),
                        suggested_filename: format!("{}.mp4", video.title),
                        actual_filename: file.filename.clone(),
                        file_path: format!("{}/{}", file_prefix, file.filename),
                        match_score: best_score,
                        upload_date: date,
                        file_date: file.date_str.clone(),
                    },
                );
            }
            _ => tracing::info!(title = %video.title, "No matching video file"),
        }
    }

    let unmatched: Vec<&str> = files.iter().map(|f| f.filename.as_str()).filter(|n| !matched.contains(n)).collect();
    if !unmatched.is_empty() {
        tracing::warn!(count = unmatched.len(), files = ?unmatched, "Unmatched video files");
    }
    tracing::info!(matched = mappings.len(), "Video mapping finished");
    mappings
}

/// Load metadata, scan `downloads_dir`, match, and write the mapping (pretty) to `out_path`.
pub fn build_video_mapping(videos_path: &Path, downloads_dir: &Path, out_path: &Path, write_buf: usize) -> Result<IndexMap<String, VideoMapping>> {
    let files = scan_video_files(downloads_dir);
    tracing::info!(files = files.len(), path = %downloads_dir.display(), "Scanned video files");
    let videos = load_video_meta(videos_path)?;
    let mappings = match_videos(&videos, &files, &display_name(downloads_dir));
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    write_json_atomic(out_path, &mappings, true, write_buf)?;
    Ok(mappings)
}
