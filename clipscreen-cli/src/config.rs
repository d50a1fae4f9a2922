// clipscreen-cli/src/config.rs
//
// Maps parsed command-line arguments onto the core configuration and builds
// the optional content moderator.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clipscreen_core::moderation::{
    ContentModerator, ModerationVocabulary, RemoteEmbeddingModel,
};
use clipscreen_core::{CoreConfig, CoreConfigBuilder};

use crate::cli::{ProcessArgs, SourceArgs};

/// Name of the temp directory created under the system temp dir when
/// `--temp-dir` is not given.
pub const DEFAULT_TEMP_DIR_NAME: &str = "clipscreen";

/// Creates and validates a CoreConfig from the processing arguments.
pub fn create_core_config(args: &ProcessArgs) -> Result<CoreConfig> {
    let temp_dir = args
        .temp_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_TEMP_DIR_NAME));

    let mut builder = CoreConfigBuilder::new()
        .temp_dir(temp_dir)
        .frame_output_dir(args.output_dir.clone())
        .max_file_size_mb(args.max_file_size_mb)
        .similarity_threshold(args.threshold)
        .rate_limit(args.rate_limit, Duration::from_secs(args.rate_limit_period));

    if let Some(report_dir) = &args.report_dir {
        builder = builder.report_dir(report_dir.clone());
    }
    if let Some(frames) = &args.frames {
        builder = builder.frame_percentages(frames.clone());
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Loads the vocabulary file when one is given, the built-in catalog
/// otherwise.
pub fn load_vocabulary(path: Option<&Path>) -> Result<ModerationVocabulary> {
    match path {
        Some(path) => ModerationVocabulary::from_json_file(path)
            .with_context(|| format!("Failed to load vocabulary '{}'", path.display())),
        None => Ok(ModerationVocabulary::default()),
    }
}

/// Builds the moderator when an embedding service is configured.
pub fn create_moderator(
    source: &SourceArgs,
    args: &ProcessArgs,
    config: &CoreConfig,
) -> Result<Option<ContentModerator<RemoteEmbeddingModel>>> {
    let Some(url) = source.embedding_url.as_deref() else {
        log::info!("No embedding service configured, moderation disabled");
        return Ok(None);
    };

    let model = RemoteEmbeddingModel::new(
        url,
        source.embedding_key.as_deref(),
        Duration::from_secs(source.service_timeout),
    )
    .context("Failed to set up the embedding service client")?;
    let vocabulary = load_vocabulary(args.vocabulary.as_deref())?;

    log::info!(
        "Moderation enabled: {} categories, {} words, threshold {}",
        vocabulary.categories().len(),
        vocabulary.word_count(),
        config.similarity_threshold
    );
    Ok(Some(ContentModerator::with_vocabulary(
        model,
        vocabulary,
        config.threshold()?,
    )))
}
