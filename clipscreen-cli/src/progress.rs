// ============================================================================
// clipscreen-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif-backed ProgressObserver
//
// Shows a bar for the batch and a transient bar for the current download.
// Bars are only drawn when stderr is a terminal; otherwise every update is
// forwarded to the log at debug level instead.
//
// AI-ASSISTANT-INFO: Terminal progress bars for the pipeline observer hooks

use std::cell::OnceCell;

use clipscreen_core::progress::{LogProgress, ProgressObserver};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const CLIP_TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} clips";
const DOWNLOAD_TEMPLATE: &str = "  {msg} [{bar:30.green/white}] {bytes}/{total_bytes} ({bytes_per_sec})";
const PROGRESS_CHARS: &str = "#>-";

/// Progress display for the `run` and `clip` commands.
pub struct CliProgress {
    multi: MultiProgress,
    clips: OnceCell<ProgressBar>,
    download: ProgressBar,
    interactive: bool,
}

impl CliProgress {
    /// Creates the display. `enabled` is false for JSON output.
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && console::user_attended_stderr();
        let multi = if interactive {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let download = multi.add(ProgressBar::hidden());
        download.set_style(
            ProgressStyle::with_template(DOWNLOAD_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(PROGRESS_CHARS),
        );
        download.set_message("download");

        Self {
            multi,
            clips: OnceCell::new(),
            download,
            interactive,
        }
    }

    fn clip_bar(&self, total: usize) -> &ProgressBar {
        self.clips.get_or_init(|| {
            let bar = self.multi.insert(0, ProgressBar::new(total as u64));
            bar.set_style(
                ProgressStyle::with_template(CLIP_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars(PROGRESS_CHARS),
            );
            bar
        })
    }

    /// Removes the bars from the terminal.
    pub fn finish(&self) {
        self.download.finish_and_clear();
        if let Some(bar) = self.clips.get() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressObserver for CliProgress {
    fn on_progress(&self, current: usize, total: usize) {
        if !self.interactive {
            LogProgress.on_progress(current, total);
            return;
        }
        let bar = self.clip_bar(total);
        bar.set_position(current as u64);
        self.download.reset();
        self.download.set_message("download");
    }

    fn on_download(&self, bytes_written: u64, expected: Option<u64>) {
        if !self.interactive {
            LogProgress.on_download(bytes_written, expected);
            return;
        }
        if let Some(total) = expected {
            self.download.set_length(total);
        }
        self.download.set_position(bytes_written);
    }

    fn on_frame(&self, index: usize, total: usize, percentage: f64) {
        if !self.interactive {
            LogProgress.on_frame(index, total, percentage);
            return;
        }
        self.download
            .set_message(format!("frame {index}/{total} at {:.0}%", percentage * 100.0));
    }
}
