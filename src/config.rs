use crate::chunk::DEFAULT_CHUNK_SIZE;
use std::path::{Path, PathBuf};

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ArchiveOptions {
    pub input_dir: PathBuf,           // directory of raw comment-log JSON files
    pub output_dir: PathBuf,          // root for every artifact an operation writes
    pub chunk_size: usize,            // comment ids per chunk file
    pub file_concurrency: usize,      // input files parsed concurrently (1 = sequential)
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub clean_output: bool,           // wipe output_dir before organizing
    pub progress: bool,               // show progress bars
    pub progress_label: Option<String>, // optional label for progress bars

    // engagement word profiles
    pub top_words: usize,
    pub top_liked_words: usize,

    pub write_buffer_bytes: usize,    // BufWriter capacity for JSON artifacts
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./comments"),
            output_dir: PathBuf::from("./organized"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            file_concurrency: 1,
            parallelism: None,
            clean_output: true,
            progress: true,
            progress_label: None,

            top_words: 20,
            top_liked_words: 15,

            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl ArchiveOptions {
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_clean_output(mut self, yes: bool) -> Self {
        self.clean_output = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_top_words(mut self, words: usize, liked_words: usize) -> Self {
        self.top_words = words;
        self.top_liked_words = liked_words;
        self
    }
    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    /// Label for a progress bar: the user label if set, else `fallback`.
    pub(crate) fn label_or(&self, fallback: &str) -> String {
        self.progress_label.clone().unwrap_or_else(|| fallback.to_string())
    }
}
