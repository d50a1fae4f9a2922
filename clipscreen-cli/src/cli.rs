// clipscreen-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use clipscreen_core::config::{
    DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_RATE_LIMIT_CALLS, DEFAULT_SIMILARITY_THRESHOLD,
};
use clipscreen_core::gateway::DEFAULT_CLIP_TABLE;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipscreen: clip frame extraction and content screening",
    long_about = "Downloads media clips listed by a metadata source, extracts frames at fixed \
                  points and optionally screens them against a moderation vocabulary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Log filter (e.g. "info", "clipscreen_core=debug"); RUST_LOG is used when unset
    #[arg(long, global = true, value_name = "LEVEL", env = "CLIPSCREEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Optional: Directory for a per-run log file
    #[arg(short, long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Processes every clip the metadata source lists
    Run(ProcessArgs),
    /// Processes a single clip by id
    Clip(ClipArgs),
    /// Checks the health of every pipeline component
    Health(ProcessArgs),
    /// Prints the active moderation vocabulary as JSON
    Vocabulary(VocabularyArgs),
}

/// Where clip records and embeddings come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON manifest of clip records (used instead of the REST store)
    #[arg(long, global = true, value_name = "FILE", env = "CLIPSCREEN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Base URL of the REST metadata store
    #[arg(long, global = true, value_name = "URL", env = "CLIPSCREEN_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// API key for the REST metadata store
    #[arg(
        long,
        global = true,
        value_name = "KEY",
        env = "CLIPSCREEN_GATEWAY_KEY",
        hide_env_values = true
    )]
    pub gateway_key: Option<String>,

    /// Table holding the clip records
    #[arg(
        long,
        global = true,
        value_name = "TABLE",
        env = "CLIPSCREEN_GATEWAY_TABLE",
        default_value = DEFAULT_CLIP_TABLE
    )]
    pub gateway_table: String,

    /// Base URL of the embedding service; moderation runs only when set
    #[arg(long, global = true, value_name = "URL", env = "CLIPSCREEN_EMBEDDING_URL")]
    pub embedding_url: Option<String>,

    /// API key for the embedding service
    #[arg(
        long,
        global = true,
        value_name = "KEY",
        env = "CLIPSCREEN_EMBEDDING_KEY",
        hide_env_values = true
    )]
    pub embedding_key: Option<String>,

    /// Request timeout for the metadata store and embedding service
    #[arg(long, global = true, value_name = "SECONDS", default_value_t = 30)]
    pub service_timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Directory where extracted frames are saved
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR", default_value = "frames")]
    pub output_dir: PathBuf,

    /// Optional: Directory for moderation reports (defaults to OUTPUT_DIR)
    #[arg(long, value_name = "REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    /// Optional: Directory for temporary downloads
    #[arg(long, value_name = "DIR", env = "CLIPSCREEN_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Largest clip that may be downloaded, in megabytes
    #[arg(
        long,
        value_name = "MB",
        env = "CLIPSCREEN_MAX_FILE_SIZE_MB",
        default_value_t = DEFAULT_MAX_FILE_SIZE_MB
    )]
    pub max_file_size_mb: u64,

    /// Cosine similarity above which a frame is flagged
    #[arg(
        long,
        value_name = "VALUE",
        env = "CLIPSCREEN_THRESHOLD",
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD
    )]
    pub threshold: f64,

    /// Comma-separated time fractions to extract frames at (e.g., 0.25,0.5,0.75)
    #[arg(long, value_delimiter = ',', value_name = "FRACTIONS")]
    pub frames: Option<Vec<f64>>,

    /// Downloads allowed to start per rate-limit window
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_RATE_LIMIT_CALLS)]
    pub rate_limit: usize,

    /// Length of the rate-limit window
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub rate_limit_period: u64,

    /// Optional: JSON vocabulary file replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub vocabulary: Option<PathBuf>,

    /// Print the results as JSON instead of a styled summary
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClipArgs {
    /// Id of the clip to process
    #[arg(required = true, value_name = "CLIP_ID")]
    pub clip_id: String,

    #[command(flatten)]
    pub process: ProcessArgs,
}

#[derive(Args, Debug, Clone)]
pub struct VocabularyArgs {
    /// Optional: JSON vocabulary file to load instead of the built-in one
    #[arg(long, value_name = "FILE")]
    pub vocabulary: Option<PathBuf>,

    /// Words to add before printing, as CATEGORY:WORD
    #[arg(long = "add", value_name = "CATEGORY:WORD")]
    pub additions: Vec<String>,
}
