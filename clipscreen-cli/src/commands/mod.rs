//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand. Commands return `Ok(true)` when
//! everything they did succeeded, `Ok(false)` when the run completed with
//! failures, and `Err` for fatal errors.

use anyhow::{Context, Result};
use clipscreen_core::moderation::RemoteEmbeddingModel;
use clipscreen_core::{Downloader, FfmpegDecoder, FrameExtractor, Pipeline, ReqwestTransport};

use crate::cli::{ProcessArgs, SourceArgs};
use crate::config::{create_core_config, create_moderator};
use crate::interrupt::interrupt_token;
use crate::source::ClipSource;

pub mod health;
pub mod run;
pub mod vocabulary;

/// The pipeline as the CLI assembles it.
pub type CliPipeline = Pipeline<ClipSource, ReqwestTransport, FfmpegDecoder, RemoteEmbeddingModel>;

/// Builds a pipeline from the source and processing arguments. Ctrl+C
/// cancels it.
pub fn build_pipeline(source: &SourceArgs, args: &ProcessArgs) -> Result<CliPipeline> {
    let config = create_core_config(args)?;
    let gateway = ClipSource::from_args(source)?;
    log::info!("Clip source: {}", gateway.describe());

    let downloader =
        Downloader::from_config(&config).context("Failed to set up the downloader")?;
    let extractor = FrameExtractor::ffmpeg(config.percentage_set()?);
    let moderator = create_moderator(source, args, &config)?;

    let pipeline = Pipeline::new(config, gateway, downloader, extractor, moderator)?;
    Ok(pipeline.with_cancellation(interrupt_token()?))
}
