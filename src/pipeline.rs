use crate::aggregate::{aggregate, ingest_files, IngestStats};
use crate::analyze::{analyze, load_post_metadata, write_report, ArchiveReport};
use crate::config::ArchiveOptions;
use crate::dedupe::dedupe_posts;
use crate::engagement::{load_records, write_engagement_indexes, EngagementReport};
use crate::index::{build_index, write_index_files, CommentIndex, Summary};
use crate::pager::ChunkPager;
use crate::paths::{discover_json_files, POSTS_DIR};
use crate::progress::ProgressScope;
use crate::util::{dir_size, init_tracing_once, mib, reset_dir};
use crate::video_map::{build_video_mapping, load_video_meta, VideoMapping};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Default)]
pub struct ArchiveETL {
    pub(crate) opts: ArchiveOptions,
}

/// What `organize_comments` produced.
#[derive(Clone, Debug)]
pub struct OrganizeReport {
    pub ingest: IngestStats,
    pub index: CommentIndex,
    pub summary: Summary,
    pub total_bytes: u64,
}

impl ArchiveETL {
    pub fn new() -> Self {
        Self { opts: ArchiveOptions::default() }
    }

    pub fn with_options(opts: ArchiveOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ArchiveOptions { &self.opts }

    // -------- Builder methods --------
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn chunk_size(mut self, n: usize) -> Self { self.opts = self.opts.with_chunk_size(n); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn clean_output(mut self, yes: bool) -> Self { self.opts = self.opts.with_clean_output(yes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn top_words(mut self, words: usize, liked_words: usize) -> Self { self.opts = self.opts.with_top_words(words, liked_words); self }
    pub fn write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_write_buffer(bytes); self }

    fn init(&self) {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism { if n > 0 { rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); } }
    }

    // -------- Operations --------

    /// Comment logs in `input_dir` → chunked static database in `output_dir`:
    /// `posts/<code>/chunk_<n>.json`, `index.json`, `summary.json`.
    pub fn organize_comments(self) -> Result<OrganizeReport> {
        self.init();
        let root = self.opts.output_dir.clone();
        tracing::info!(input = %self.opts.input_dir.display(), output = %root.display(), "Starting static comment organization");

        let files = discover_json_files(&self.opts.input_dir)?;
        if files.is_empty() {
            tracing::warn!("No comment log files found. Check the input directory.");
        } else {
            tracing::info!("Planned {} files for processing.", files.len());
        }

        if self.opts.clean_output {
            reset_dir(&root)?;
        }
        let posts_dir = root.join(POSTS_DIR);
        fs::create_dir_all(&posts_dir).with_context(|| format!("create {}", posts_dir.display()))?;

        let pb = ProgressScope::count_if(self.opts.progress, self.opts.label_or("Parsing comment logs"), files.len() as u64);
        let parsed = ingest_files(&files, self.opts.file_concurrency, pb.as_ref());
        if let Some(pb) = &pb { pb.finish("parsing done"); }

        let merged = aggregate(parsed.into_iter().map(|(_, r)| r));
        let ingest = merged.stats;
        tracing::info!(
            posts = merged.posts.len(),
            files = ingest.files,
            failed_files = ingest.failed_files,
            entries = ingest.processed,
            error_entries = ingest.error_entries,
            "Found comments"
        );

        let posts = dedupe_posts(merged.posts);

        let pb = ProgressScope::count_if(self.opts.progress, self.opts.label_or("Writing chunks"), posts.len() as u64);
        let index = build_index(&root, &posts, self.opts.chunk_size, self.opts.write_buffer_bytes, pb.as_ref());
        if let Some(pb) = &pb { pb.finish("chunks written"); }

        let summary = write_index_files(&root, &index, self.opts.write_buffer_bytes)?;

        let total_bytes = dir_size(&root);
        tracing::info!(size_mb = %format!("{:.1}", mib(total_bytes)), location = %root.display(), "Static comment database created");
        Ok(OrganizeReport { ingest, index, summary, total_bytes })
    }

    /// Flat engagement export → `video_comments_index.json`, `search_index.json`,
    /// `word_freq_index.json` in `output_dir`. `videos`, when given, must exist.
    pub fn preindex_engagement(self, comments: &Path, videos: Option<&Path>) -> Result<EngagementReport> {
        self.init();
        let video_count = match videos {
            Some(p) => Some(load_video_meta(p)?.len()),
            None => None,
        };
        let records = load_records(comments)?;
        tracing::info!(videos = ?video_count, comments = records.len(), "Loaded engagement data");

        let report = write_engagement_indexes(
            &records,
            &self.opts.output_dir,
            self.opts.top_words,
            self.opts.top_liked_words,
            self.opts.write_buffer_bytes,
        )?;
        tracing::info!(
            video_index_mb = %format!("{:.1}", mib(report.video_index_bytes)),
            search_index_mb = %format!("{:.1}", mib(report.search_index_bytes)),
            word_freq_mb = %format!("{:.1}", mib(report.word_freq_bytes)),
            "Indexing complete"
        );
        Ok(report)
    }

    /// Statistics over `input_dir`, written to `output_dir/comment_statistics.json`.
    /// `metadata` (the archive's post CSV), when given, must exist.
    pub fn analyze_comments(self, metadata: Option<&Path>) -> Result<ArchiveReport> {
        self.init();
        let known = metadata.map(load_post_metadata).transpose()?;
        let files = discover_json_files(&self.opts.input_dir)?;
        tracing::info!("Found {} JSON files to analyze", files.len());

        let pb = ProgressScope::count_if(self.opts.progress, self.opts.label_or("Analyzing comment logs"), files.len() as u64);
        let parsed = ingest_files(&files, self.opts.file_concurrency, pb.as_ref());
        if let Some(pb) = &pb { pb.finish("analysis done"); }

        let report = analyze(&parsed, known.as_ref());
        tracing::info!(
            posts_with_comments = report.posts_with_comments,
            total_comment_ids = report.total_comment_ids,
            unique_comments = report.unique_comments,
            duplicate_comments = report.duplicate_comments,
            missing_posts = ?report.missing_posts,
            extra_posts = ?report.extra_posts,
            "Overall statistics"
        );
        write_report(&self.opts.output_dir, &report, self.opts.write_buffer_bytes)?;
        Ok(report)
    }

    /// Match files in `downloads_dir` to `videos_json` metadata; write `out_path`.
    pub fn map_videos(self, videos_json: &Path, downloads_dir: &Path, out_path: &Path) -> Result<IndexMap<String, VideoMapping>> {
        self.init();
        build_video_mapping(videos_json, downloads_dir, out_path, self.opts.write_buffer_bytes)
    }

    /// Open a pager over an organized directory (`output_dir` by default).
    pub fn pager(self) -> Result<ChunkPager> {
        self.init();
        ChunkPager::open(&self.opts.output_dir)
    }
}
