//! Configuration structures and constants for the clipscreen-core library.
//!
//! Every value here is read once when a pipeline is constructed and treated
//! as immutable for the lifetime of that pipeline.

mod builder;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::frames::FramePercentageSet;
use crate::moderation::SimilarityThreshold;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default download ceiling in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Default download ceiling in bytes.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024;

/// Time fractions at which frames are extracted when the caller gives none.
pub const DEFAULT_FRAME_PERCENTAGES: [f64; 3] = [0.25, 0.5, 0.75];

/// Cosine similarity above which a frame is flagged.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.25;

/// Download operations allowed to start within one rate-limit window.
pub const DEFAULT_RATE_LIMIT_CALLS: usize = 5;

/// Length of the rolling rate-limit window.
pub const DEFAULT_RATE_LIMIT_PERIOD: Duration = Duration::from_secs(60);

/// Size of each body chunk written during a download.
pub const DEFAULT_DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Connect timeout for download requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read timeout for download requests.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent with every download request.
pub const DEFAULT_USER_AGENT: &str = concat!("clipscreen/", env!("CARGO_PKG_VERSION"));

/// Video container extensions recognised when naming temp download files.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Extension used for temp download files when the URL does not carry one.
pub const DEFAULT_TEMP_EXTENSION: &str = "mov";

/// Main configuration structure for the clipscreen-core library.
///
/// Created by the consumer of the library (e.g., clipscreen-cli) and handed
/// to the pipeline at construction. Only the directory fields usually need
/// to be set; everything else has a sensible default.
///
/// # Examples
///
/// ```rust
/// use clipscreen_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .temp_dir(PathBuf::from("/tmp/clipscreen"))
///     .frame_output_dir(PathBuf::from("frames"))
///     .max_download_bytes(50 * 1024 * 1024)
///     .similarity_threshold(0.3)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding per-clip temporary downloads
    pub temp_dir: PathBuf,

    /// Directory where extracted frame images are written
    pub frame_output_dir: PathBuf,

    /// Directory for moderation reports (defaults to `frame_output_dir`)
    pub report_dir: Option<PathBuf>,

    /// Largest body a single download may write
    pub max_download_bytes: u64,

    /// Default time fractions for frame extraction
    pub frame_percentages: Vec<f64>,

    /// Threshold handed to the content moderator
    pub similarity_threshold: f64,

    /// Downloads allowed to start per rate-limit window
    pub rate_limit_calls: usize,

    /// Length of the rate-limit window
    pub rate_limit_period: Duration,

    /// Size of each chunk written to disk during a download
    pub download_chunk_size: usize,

    pub connect_timeout: Duration,

    pub read_timeout: Duration,

    pub user_agent: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("clipscreen"),
            frame_output_dir: PathBuf::from("."),
            report_dir: None,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            frame_percentages: DEFAULT_FRAME_PERCENTAGES.to_vec(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            rate_limit_calls: DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period: DEFAULT_RATE_LIMIT_PERIOD,
            download_chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with the given temp and frame directories and
    /// defaults for everything else.
    pub fn new(temp_dir: PathBuf, frame_output_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            frame_output_dir,
            ..Self::default()
        }
    }

    /// Directory where moderation reports are written.
    pub fn effective_report_dir(&self) -> &PathBuf {
        self.report_dir.as_ref().unwrap_or(&self.frame_output_dir)
    }

    /// Validated view of the configured frame percentages.
    pub fn percentage_set(&self) -> CoreResult<FramePercentageSet> {
        FramePercentageSet::new(self.frame_percentages.clone())
    }

    /// Validated view of the configured similarity threshold.
    pub fn threshold(&self) -> CoreResult<SimilarityThreshold> {
        SimilarityThreshold::new(self.similarity_threshold)
    }

    /// Checks the configuration for values no pipeline could run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_download_bytes == 0 {
            return Err(CoreError::Config(
                "max_download_bytes must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_calls == 0 {
            return Err(CoreError::Config(
                "rate_limit_calls must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_period.is_zero() {
            return Err(CoreError::Config(
                "rate_limit_period must be greater than zero".to_string(),
            ));
        }
        if self.download_chunk_size == 0 {
            return Err(CoreError::Config(
                "download_chunk_size must be greater than zero".to_string(),
            ));
        }
        self.percentage_set()
            .map_err(|e| CoreError::Config(format!("frame_percentages: {e}")))?;
        self.threshold()
            .map_err(|e| CoreError::Config(format!("similarity_threshold: {e}")))?;
        Ok(())
    }
}
