// ============================================================================
// clipscreen-cli/src/interrupt.rs
// ============================================================================
//
// INTERRUPT HANDLING: Ctrl+C as cooperative cancellation
//
// The first Ctrl+C cancels the pipeline's token. The clip in flight stops at
// its next check, its temp file and decoder are released, and the batch ends
// with a partial report. A second Ctrl+C exits immediately.
//
// AI-ASSISTANT-INFO: Process-wide Ctrl+C handler feeding the pipeline's CancellationToken

use std::sync::OnceLock;

use anyhow::{Context, Result};
use clipscreen_core::CancellationToken;

/// Exit code used when a second interrupt forces the process to quit.
const FORCED_EXIT_CODE: i32 = 130;

static INTERRUPT_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

/// Returns the token cancelled by Ctrl+C, installing the handler on first use.
pub fn interrupt_token() -> Result<CancellationToken> {
    if let Some(token) = INTERRUPT_TOKEN.get() {
        return Ok(token.clone());
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        if !request_stop(&handler_token) {
            log::error!("Second interrupt, exiting without cleanup");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
    .context("Failed to install the Ctrl+C handler")?;

    Ok(INTERRUPT_TOKEN.get_or_init(|| token).clone())
}

/// Cancels `token`. Returns false when it was already cancelled.
fn request_stop(token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    token.cancel();
    log::warn!("Interrupt received, stopping after the current step (Ctrl+C again to quit now)");
    true
}
