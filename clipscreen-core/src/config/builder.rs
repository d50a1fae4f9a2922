// ============================================================================
// clipscreen-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every setter starts from the library
// defaults, so callers only name what they change.

use std::path::PathBuf;
use std::time::Duration;

use super::CoreConfig;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder seeded with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory for per-clip temporary downloads.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = temp_dir;
        self
    }

    /// Sets the directory where frame images are written.
    pub fn frame_output_dir(mut self, frame_output_dir: PathBuf) -> Self {
        self.config.frame_output_dir = frame_output_dir;
        self
    }

    /// Sets the directory for moderation reports.
    pub fn report_dir(mut self, report_dir: PathBuf) -> Self {
        self.config.report_dir = Some(report_dir);
        self
    }

    /// Sets the download ceiling in bytes.
    pub fn max_download_bytes(mut self, bytes: u64) -> Self {
        self.config.max_download_bytes = bytes;
        self
    }

    /// Sets the download ceiling in megabytes. Values too large to express
    /// in bytes saturate at `u64::MAX`.
    pub fn max_file_size_mb(mut self, megabytes: u64) -> Self {
        self.config.max_download_bytes = megabytes.saturating_mul(1024 * 1024);
        self
    }

    /// Sets the default frame percentages.
    pub fn frame_percentages(mut self, percentages: Vec<f64>) -> Self {
        self.config.frame_percentages = percentages;
        self
    }

    /// Sets the similarity threshold used by the moderator.
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Sets how many downloads may start within `period`.
    pub fn rate_limit(mut self, calls: usize, period: Duration) -> Self {
        self.config.rate_limit_calls = calls;
        self.config.rate_limit_period = period;
        self
    }

    pub fn download_chunk_size(mut self, size: usize) -> Self {
        self.config.download_chunk_size = size;
        self
    }

    /// Sets the connect and read timeouts for downloads.
    pub fn timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.config.connect_timeout = connect;
        self.config.read_timeout = read;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Builds the CoreConfig. Call `validate()` on the result before use.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
