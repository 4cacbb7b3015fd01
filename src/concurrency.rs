//! Concurrency helper: limit the number of input files parsed in parallel.

use rayon::prelude::*;
use std::path::PathBuf;

/// Map `f` over `files` with at most `limit` in flight. Results keep the order
/// of `files` regardless of `limit`.
pub fn map_files_limited<T, F>(files: &[PathBuf], limit: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Sync + Fn(&PathBuf) -> T,
{
    if limit <= 1 {
        return files.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(files.len());
    for chunk in files.chunks(limit) {
        out.extend(chunk.par_iter().map(&f).collect::<Vec<_>>());
    }
    out
}
