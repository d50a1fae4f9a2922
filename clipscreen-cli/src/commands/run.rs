//! Implementation of the `run` and `clip` subcommands.
//!
//! Both build a pipeline from the command line, process clips through it and
//! report the outcome either as a styled summary or as JSON.

use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::cli::{ClipArgs, ProcessArgs, SourceArgs};
use crate::commands::build_pipeline;
use crate::output;
use crate::progress::CliProgress;

/// Processes every clip the source lists. Returns false when any clip failed.
pub fn run_batch(source: &SourceArgs, args: &ProcessArgs) -> Result<bool> {
    let total_start_time = Instant::now();
    debug!("Run started: {}", chrono::Local::now());

    let mut pipeline = build_pipeline(source, args)?;
    info!(
        "Frames go to {}, downloads to {}",
        pipeline.config().frame_output_dir.display(),
        pipeline.config().temp_dir.display()
    );

    let progress = CliProgress::new(!args.json);
    let outcome = pipeline.process_all(&progress);
    progress.finish();
    let report = outcome.context("Failed to list clips")?;

    if report.statistics.total == 0 {
        warn!("No clips to process");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_batch_summary(&report, total_start_time.elapsed());
    }

    debug!("Finished at: {}", chrono::Local::now());
    Ok(!report.has_failures())
}

/// Processes one clip by id. Returns false when the clip failed.
pub fn run_clip(source: &SourceArgs, args: &ClipArgs) -> Result<bool> {
    let mut pipeline = build_pipeline(source, &args.process)?;

    let progress = CliProgress::new(!args.process.json);
    let outcome = pipeline.process_clip_by_id(&args.clip_id, &progress);
    progress.finish();

    let Some(result) = outcome.with_context(|| format!("Failed to look up clip {}", args.clip_id))?
    else {
        output::print_error("Clip not found", &format!("no clip with id '{}'", args.clip_id));
        return Ok(false);
    };

    if args.process.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_clip_result(&result);
    }
    Ok(result.success)
}
