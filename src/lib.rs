mod config;
mod paths;
mod progress;
mod concurrency;
mod util;
mod pipeline;

mod entry;
mod aggregate;
mod dedupe;
mod chunk;
mod index;
mod pager;

mod words;
mod engagement;
mod analyze;
mod video_map;

pub use crate::config::ArchiveOptions;
pub use crate::pipeline::{ArchiveETL, OrganizeReport};

// Comment indexing pipeline stages, usable on their own.
pub use crate::entry::{parse_entry, document_entries, CommentLogEntry, EntryOutcome, SkipReason};
pub use crate::aggregate::{aggregate, ingest_files, parse_file, FileResult, IngestStats, PostCommentSet};
pub use crate::dedupe::{dedupe_ordered, dedupe_posts};
pub use crate::chunk::{plan_chunks, read_chunk, write_post_chunks, Chunk, ChunkDescriptor, PostDescriptor, DEFAULT_CHUNK_SIZE};
pub use crate::index::{build_index, write_index_files, CommentIndex, RunStats, Summary, SummaryEntry};
pub use crate::pager::{ChunkPager, Page};

// Engagement indexing.
pub use crate::engagement::{
    build_search_index, build_video_index, build_word_freq_index, load_records, write_engagement_indexes,
    EngagementRecord, EngagementReport, SearchEntry,
};
pub use crate::words::{content_words, is_stop_word, liked_subset_len, liked_words, word_cloud, LikedWord, WordCount, WordProfile};

// Archive analysis and video mapping.
pub use crate::analyze::{analyze, load_post_metadata, ArchiveReport, FileStats};
pub use crate::video_map::{
    match_score, match_videos, parse_video_filename, sanitize_title, scan_video_files, upload_date, VideoFile, VideoMapping, VideoMeta,
};

// Progress and file helpers for binaries.
pub use crate::progress::{make_count_progress, ProgressScope};
pub use crate::paths::{chunk_rel_path, discover_json_files, INDEX_FILE, SUMMARY_FILE};
pub use crate::util::init_tracing_once;
