// ============================================================================
// clipscreen-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Observer Interface for Pipeline Progress
//
// The core library never prints. Callers that want progress updates implement
// ProgressObserver; every method has a no-op default, so an observer only
// overrides what it displays. NullProgress is the observer for callers that
// want nothing.

use std::fmt;

/// Receives progress notifications from the downloader, the frame extractor
/// and the pipeline.
pub trait ProgressObserver {
    /// Called after each clip of a batch is finalized.
    fn on_progress(&self, _current: usize, _total: usize) {}

    /// Called after each chunk written by a download. `expected` is the size
    /// reported by the server, when it reported one.
    fn on_download(&self, _bytes_written: u64, _expected: Option<u64>) {}

    /// Called after each frame is decoded. `index` is 1-based.
    fn on_frame(&self, _index: usize, _total: usize, _percentage: f64) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {}

impl fmt::Display for NullProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no progress reporting")
    }
}

/// Observer that forwards every notification to the `log` facade at debug
/// level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, current: usize, total: usize) {
        log::debug!("Clip progress: {current}/{total}");
    }

    fn on_download(&self, bytes_written: u64, expected: Option<u64>) {
        match expected {
            Some(total) if total > 0 => {
                let percent = bytes_written as f64 / total as f64 * 100.0;
                log::debug!("Download progress: {bytes_written}/{total} bytes ({percent:.1}%)");
            }
            _ => log::debug!("Download progress: {bytes_written} bytes"),
        }
    }

    fn on_frame(&self, index: usize, total: usize, percentage: f64) {
        log::debug!(
            "Frame extraction progress: {index}/{total} frames ({:.1}%)",
            percentage * 100.0
        );
    }
}
