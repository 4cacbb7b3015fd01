use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};
use std::thread::sleep;
use std::time::Duration;
use walkdir::WalkDir;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Transient failures worth another attempt: interrupted calls, busy files on
/// synced or removable folders (EBUSY, EAGAIN, Windows sharing and lock violations).
fn is_transient(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
        || matches!(e.raw_os_error(), Some(5 | 11 | 16 | 21 | 32 | 33))
}

/// Run `op` up to `tries` times, sleeping a little longer after each transient failure.
fn retry_io<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Err(e) if attempt < tries && is_transient(&e) => {
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
            }
            res => return res,
        }
    }
}

/// Serialize `value` as JSON into a `.inprogress` sibling of `dest`, then rename into place.
/// `pretty == false` writes compact JSON (no whitespace between separators).
pub fn write_json_atomic<T: Serialize + ?Sized>(dest: &Path, value: &T, pretty: bool, write_buf: usize) -> Result<()> {
    let tmp = dest.with_extension("json.inprogress");
    let f = retry_io(16, 50, || File::create(&tmp)).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::with_capacity(write_buf.max(8 * 1024), f);
    if pretty {
        serde_json::to_writer_pretty(&mut w, value)
    } else {
        serde_json::to_writer(&mut w, value)
    }
    .with_context(|| format!("serialize {}", dest.display()))?;
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);
    retry_io(20, 50, || fs::rename(&tmp, dest))
        .with_context(|| format!("rename {} -> {}", tmp.display(), dest.display()))
}

/// Recreate `dir` from scratch (remove everything below it first).
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        tracing::info!(path = %dir.display(), "Cleaning existing output directory");
        fs::remove_dir_all(dir).with_context(|| format!("remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(())
}

/// Total size in bytes of all regular files below `root`.
pub fn dir_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// True if `name` can be used as exactly one path component below an output root.
pub fn is_single_component(name: &str) -> bool {
    let mut comps = Path::new(name).components();
    matches!((comps.next(), comps.next()), (Some(Component::Normal(c)), None) if c == name)
}

pub fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
