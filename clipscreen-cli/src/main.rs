// ============================================================================
// clipscreen-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: clipscreen command-line application
//
// Parses arguments, sets up logging, dispatches to the selected command and
// turns its outcome into the process exit code:
// - 0: every clip (or component) succeeded
// - 1: at least one failure, or a fatal error
//
// AI-ASSISTANT-INFO: Entry point for the clipscreen CLI

use std::process::ExitCode;

use clap::Parser;
use clipscreen_cli::logging::{init_logging, resolve_filter};
use clipscreen_cli::output::print_error;
use clipscreen_cli::{Cli, Commands, run_batch, run_clip, run_health, run_vocabulary};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = resolve_filter(cli.verbose, cli.log_level.as_deref());
    match init_logging(&filter, cli.log_dir.as_deref()) {
        Ok(Some(path)) => log::info!("Log file: {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            print_error("Error", &format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    }

    let result = match &cli.command {
        Commands::Run(args) => run_batch(&cli.source, args),
        Commands::Clip(args) => run_clip(&cli.source, args),
        Commands::Health(args) => run_health(&cli.source, args),
        Commands::Vocabulary(args) => run_vocabulary(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::debug!("Fatal error: {e:?}");
            print_error("Error", &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
