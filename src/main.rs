use anyhow::Result;
use archidx::{ArchiveETL, DEFAULT_CHUNK_SIZE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "archidx")]
#[command(about = "Index a personal comment archive into static JSON", long_about = None)]
struct Cli {
    /// Hide progress bars
    #[arg(long, global = true, default_value_t = false)]
    no_progress: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate comment logs and write chunked per-post files plus index/summary
    Organize {
        /// Directory of comment-log JSON files
        #[arg(long)]
        input: PathBuf,
        /// Output directory (cleaned first unless --no-clean)
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Files parsed concurrently
        #[arg(long, default_value_t = 1)]
        file_concurrency: usize,
        #[arg(long, default_value_t = false)]
        no_clean: bool,
    },
    /// Build video/search/word-frequency indexes from a flat comment export
    Preindex {
        /// JSON array of engagement records
        #[arg(long)]
        comments: PathBuf,
        /// Video metadata; must exist when given
        #[arg(long)]
        videos: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Report comment counts, duplicates and missing posts
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Post metadata CSV with a `Shortcode` column
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
    /// Match downloaded video files to video metadata
    MapVideos {
        #[arg(long)]
        videos: PathBuf,
        #[arg(long)]
        downloads: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Print one page of a post's comment ids from an organized directory
    Page {
        #[arg(long)]
        root: PathBuf,
        #[arg(long)]
        post: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 50)]
        page_size: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base = ArchiveETL::new().progress(!cli.no_progress);

    match cli.command {
        Commands::Organize { input, output, chunk_size, file_concurrency, no_clean } => {
            let report = base
                .input_dir(&input)
                .output_dir(&output)
                .chunk_size(chunk_size)
                .file_concurrency(file_concurrency)
                .clean_output(!no_clean)
                .organize_comments()?;
            println!(
                "Organized {} posts, {} comments in {} chunks",
                report.index.stats.total_posts, report.index.stats.total_comments, report.index.stats.total_chunks
            );
        }
        Commands::Preindex { comments, videos, output } => {
            let report = base.output_dir(&output).preindex_engagement(&comments, videos.as_deref())?;
            println!("Indexed {} comments across {} videos", report.comments, report.videos);
        }
        Commands::Analyze { input, output, metadata } => {
            let report = base.input_dir(&input).output_dir(&output).analyze_comments(metadata.as_deref())?;
            println!(
                "{} posts with comments, {} unique comment ids ({} duplicated)",
                report.posts_with_comments, report.unique_comments, report.duplicate_comments
            );
        }
        Commands::MapVideos { videos, downloads, output } => {
            let mappings = base.map_videos(&videos, &downloads, &output)?;
            println!("Mapped {} videos to local files", mappings.len());
        }
        Commands::Page { root, post, page, page_size } => {
            let mut pager = base.output_dir(&root).pager()?;
            let result = pager.page(&post, page, page_size)?;
            println!("{}", serde_json::to_string(&result)?);
        }
    }
    Ok(())
}
