use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const INDEX_FILE: &str = "index.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const POSTS_DIR: &str = "posts";

pub const VIDEO_COMMENTS_INDEX_FILE: &str = "video_comments_index.json";
pub const SEARCH_INDEX_FILE: &str = "search_index.json";
pub const WORD_FREQ_INDEX_FILE: &str = "word_freq_index.json";

pub const STATISTICS_FILE: &str = "comment_statistics.json";
pub const MISSING_POSTS_FILE: &str = "missing_comment_posts.txt";

/// Comment-log inputs: `*.json` directly inside `dir`, minus `._*` resource forks.
/// Sorted by file name so every run visits files in the same order.
pub fn discover_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("comment log directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let ent = match entry {
            Ok(ent) => ent,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if name.ends_with(".json") && !name.starts_with("._") {
                files.push(ent.path().to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Location of a chunk relative to the output root, with `/` separators
/// (this string is what the index stores and what a browser fetches).
pub fn chunk_rel_path(shortcode: &str, chunk_index: usize) -> String {
    format!("{POSTS_DIR}/{shortcode}/chunk_{chunk_index}.json")
}

/// Resolve a stored `posts/<code>/chunk_<n>.json` location against `root`.
pub fn resolve_rel(root: &Path, rel: &str) -> PathBuf {
    rel.split('/').fold(root.to_path_buf(), |p, part| p.join(part))
}

/// Short display name for a path (file name, or the full path if it has none).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
