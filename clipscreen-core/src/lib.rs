//! Core library for screening remote video clips.
//!
//! This crate downloads clips under a size and rate ceiling, extracts still
//! frames at fractions of each clip's duration, screens those frames against
//! a moderation vocabulary in embedding space, and orchestrates the whole
//! thing per clip with guaranteed temp file cleanup.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipscreen_core::config::CoreConfigBuilder;
//! use clipscreen_core::download::Downloader;
//! use clipscreen_core::frames::FrameExtractor;
//! use clipscreen_core::gateway::ManifestGateway;
//! use clipscreen_core::moderation::{ContentModerator, RemoteEmbeddingModel};
//! use clipscreen_core::{NullProgress, Pipeline};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let config = CoreConfigBuilder::new()
//!     .temp_dir(PathBuf::from("/tmp/clipscreen"))
//!     .frame_output_dir(PathBuf::from("frames"))
//!     .build();
//!
//! let model = RemoteEmbeddingModel::new("http://localhost:9000", None, Duration::from_secs(30)).unwrap();
//! let mut pipeline = Pipeline::new(
//!     config.clone(),
//!     ManifestGateway::new("clips.json"),
//!     Downloader::from_config(&config).unwrap(),
//!     FrameExtractor::ffmpeg(config.percentage_set().unwrap()),
//!     Some(ContentModerator::new(model)),
//! )
//! .unwrap();
//!
//! let report = pipeline.process_all(&NullProgress).unwrap();
//! println!("{} of {} clips succeeded", report.statistics.successful, report.statistics.total);
//! ```

pub mod config;
pub mod download;
pub mod error;
pub mod frames;
pub mod gateway;
pub mod moderation;
pub mod pipeline;
pub mod progress;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use download::{DownloadReport, DownloadSpec, Downloader, HttpTransport, RateLimiter, ReqwestTransport};
pub use error::{CoreError, CoreResult};
pub use frames::{ExtractedFrame, FfmpegDecoder, FrameExtractor, FramePercentageSet, VideoDecoder, VideoInfo};
pub use gateway::{ClipRecord, InMemoryGateway, ManifestGateway, MetadataGateway, RestGateway};
pub use moderation::{
    ContentModerator, EmbeddingModel, ModerationReport, ModerationVerdict, ModerationVocabulary,
    RemoteEmbeddingModel, SimilarityThreshold, cosine_similarity,
};
pub use pipeline::{
    BatchReport, CancellationToken, ClipStage, HealthReport, Pipeline, ProcessingResult,
    ProcessingStatistics,
};
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use utils::{format_bytes, format_duration, format_elapsed};
