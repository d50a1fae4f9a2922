//! Implementation of the `health` subcommand.

use anyhow::Result;

use crate::cli::{ProcessArgs, SourceArgs};
use crate::commands::build_pipeline;
use crate::output;

/// Checks every component. Returns false when any is unhealthy.
pub fn run_health(source: &SourceArgs, args: &ProcessArgs) -> Result<bool> {
    let pipeline = build_pipeline(source, args)?;
    let report = pipeline.health_check();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_health(&report);
    }
    Ok(report.all_healthy())
}
