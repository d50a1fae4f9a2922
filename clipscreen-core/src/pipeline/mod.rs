// ============================================================================
// clipscreen-core/src/pipeline/mod.rs
// ============================================================================
//
// PIPELINE ORCHESTRATOR: Per-clip download, extraction, moderation, output
//
// The Pipeline pulls clip records from a MetadataGateway and processes them
// one at a time. Each clip is downloaded into a guarded temp file, frames are
// extracted from it, optionally moderated, and written out as JPEG
// artifacts. Whatever happens to a clip becomes its ProcessingResult; only a
// failure to enumerate clips aborts a batch.
//
// KEY COMPONENTS:
// - Pipeline: owns every component, the configuration and the counters
// - ClipAttempt / ProcessingResult / ClipStage: per-clip state (result.rs)
// - ProcessingStatistics / BatchReport: batch counters (stats.rs)
// - HealthReport: advisory component health (health.rs)
// - CancellationToken: cooperative stop flag (cancel.rs)
//
// AI-ASSISTANT-INFO: Orchestrates clip processing; every temp file is owned
// by a TempFileGuard that is dropped before the clip's result is built.

mod cancel;
mod health;
mod result;
mod stats;

pub use cancel::CancellationToken;
pub use health::HealthReport;
pub use result::{ClipAttempt, ClipStage, ProcessingResult};
pub use stats::{BatchReport, ProcessingStatistics};

// ---- Standard library imports ----
use std::fs;

// ---- External crate imports ----
use image::ImageFormat;

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::download::{Downloader, HttpTransport};
use crate::error::{CoreError, CoreResult};
use crate::frames::{ExtractedFrame, FrameExtractor, VideoDecoder};
use crate::gateway::{ClipRecord, MetadataGateway};
use crate::moderation::{ContentModerator, EmbeddingModel, FrameModeration, ModerationReport};
use crate::progress::ProgressObserver;
use crate::temp_files::{TempFileGuard, probe_dir_writable, remove_if_present, temp_download_path};
use crate::utils::{format_elapsed, frame_file_name};

/// Sequential clip-screening pipeline.
pub struct Pipeline<G, T, D, M>
where
    G: MetadataGateway,
    T: HttpTransport,
    D: VideoDecoder,
    M: EmbeddingModel,
{
    gateway: G,
    downloader: Downloader<T>,
    extractor: FrameExtractor<D>,
    moderator: Option<ContentModerator<M>>,
    config: CoreConfig,
    stats: ProcessingStatistics,
    cancel: CancellationToken,
}

impl<G, T, D, M> Pipeline<G, T, D, M>
where
    G: MetadataGateway,
    T: HttpTransport,
    D: VideoDecoder,
    M: EmbeddingModel,
{
    /// Assembles a pipeline. Moderation runs only when a moderator is given.
    pub fn new(
        config: CoreConfig,
        gateway: G,
        mut downloader: Downloader<T>,
        extractor: FrameExtractor<D>,
        moderator: Option<ContentModerator<M>>,
    ) -> CoreResult<Self> {
        config.validate()?;
        log::debug!(
            "Pipeline configured: temp_dir={}, frames={}, moderation={}",
            config.temp_dir.display(),
            config.frame_output_dir.display(),
            if moderator.is_some() { "on" } else { "off" }
        );
        let cancel = CancellationToken::new();
        downloader.set_cancellation(cancel.clone());
        Ok(Self {
            gateway,
            downloader,
            extractor,
            moderator,
            config,
            stats: ProcessingStatistics::default(),
            cancel,
        })
    }

    /// Replaces the cancellation token, typically with one shared with a
    /// signal handler. A running download observes it between chunks.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.downloader.set_cancellation(token.clone());
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn statistics(&self) -> ProcessingStatistics {
        self.stats
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn moderator(&self) -> Option<&ContentModerator<M>> {
        self.moderator.as_ref()
    }

    pub fn moderator_mut(&mut self) -> Option<&mut ContentModerator<M>> {
        self.moderator.as_mut()
    }

    /// Processes every clip the gateway lists.
    ///
    /// Statistics are reset first. Per-clip failures are recorded in the
    /// report; only a listing failure is returned as an error.
    pub fn process_all(&mut self, progress: &dyn ProgressObserver) -> CoreResult<BatchReport> {
        self.stats.reset();

        let clips = self.gateway.list_clips()?;
        let total = clips.len();
        log::info!("Found {total} clips to process");

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;
        for (index, record) in clips.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::warn!(
                    "Processing cancelled, {} clips not started",
                    total - index
                );
                cancelled = true;
                break;
            }

            log::info!(
                "Processing clip {}/{}: {} ({})",
                index + 1,
                total,
                record.id,
                record.title
            );
            results.push(self.process_clip(record, progress));
            progress.on_progress(index + 1, total);
            log::info!(
                "Progress: {}/{} clips, success rate {:.1}%",
                index + 1,
                total,
                self.stats.success_rate()
            );
        }

        let report = BatchReport {
            results,
            statistics: self.stats,
            cancelled: cancelled || self.cancel.is_cancelled(),
        };
        log::info!(
            "Batch finished: {} succeeded, {} failed ({:.1}%)",
            report.statistics.successful,
            report.statistics.failed,
            report.statistics.success_rate_rounded()
        );
        Ok(report)
    }

    /// Processes a single clip by id. `Ok(None)` when the gateway does not
    /// know the id.
    pub fn process_clip_by_id(
        &mut self,
        clip_id: &str,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<Option<ProcessingResult>> {
        match self.gateway.get_clip(clip_id)? {
            Some(record) => Ok(Some(self.process_clip(&record, progress))),
            None => {
                log::warn!("Clip {clip_id} not found");
                Ok(None)
            }
        }
    }

    /// Runs one clip to a finalized result and counts it.
    pub fn process_clip(
        &mut self,
        record: &ClipRecord,
        progress: &dyn ProgressObserver,
    ) -> ProcessingResult {
        let mut attempt = ClipAttempt::begin(record);
        let result = match self.drive_clip(&mut attempt, record, progress) {
            Ok(()) => attempt.succeed(),
            Err(e) => {
                discard_frames(&mut attempt);
                attempt.fail(&e)
            }
        };
        self.stats.record(&result);
        result
    }

    /// Advisory health of every component. Read-only apart from a probe file
    /// in the temp directory; a missing temp directory is reported, not
    /// created.
    pub fn health_check(&self) -> HealthReport {
        let temp_dir = &self.config.temp_dir;
        let temp_directory = match probe_dir_writable(temp_dir) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Temp directory {} is not writable: {e}", temp_dir.display());
                false
            }
        };

        let report = HealthReport {
            metadata_gateway: self.gateway.check_connection(),
            temp_directory,
            downloader: self.downloader.is_ready(),
            frame_extractor: self.extractor.is_ready(),
        };
        if report.all_healthy() {
            log::info!("All components healthy");
        } else {
            log::warn!("Unhealthy components: {}", report.unhealthy_components().join(", "));
        }
        report
    }

    fn drive_clip(
        &mut self,
        attempt: &mut ClipAttempt,
        record: &ClipRecord,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<()> {
        self.cancel.check()?;
        let url = record.url().ok_or_else(|| {
            CoreError::MissingInput(format!("clip {} has no source URL", record.id))
        })?;

        attempt.advance(ClipStage::Downloading)?;
        let temp_file = TempFileGuard::claim(temp_download_path(&self.config.temp_dir, &record.id, url))?;
        self.downloader
            .download(url, temp_file.path(), self.config.max_download_bytes, progress)?;
        self.cancel.check()?;

        attempt.advance(ClipStage::Extracting)?;
        let frames =
            self.extractor
                .extract(temp_file.path(), &self.config.frame_percentages, progress)?;
        attempt.set_frames_extracted(frames.len());
        // The video is not needed past this point.
        drop(temp_file);
        self.cancel.check()?;

        let moderated = match self.moderator.as_mut() {
            Some(moderator) => {
                attempt.advance(ClipStage::Moderating)?;
                for (index, frame) in frames.iter().enumerate() {
                    self.cancel.check()?;
                    let verdict = moderator.moderate_frame(frame)?;
                    attempt.record_moderation(FrameModeration {
                        index: index + 1,
                        percentage: frame.percentage,
                        timestamp_secs: frame.timestamp_secs,
                        verdict,
                    });
                }
                Some(moderator.threshold().value())
            }
            None => None,
        };
        self.cancel.check()?;

        attempt.advance(ClipStage::Finalizing)?;
        self.save_frames(attempt, &record.id, &frames)?;

        if let Some(threshold) = moderated {
            let report = ModerationReport::new(
                attempt.clip_id(),
                attempt.clip_title(),
                threshold,
                attempt.moderation().to_vec(),
            );
            let path = report.write_to_dir(self.config.effective_report_dir())?;
            attempt.set_report_path(path);
        }
        Ok(())
    }

    fn save_frames(
        &self,
        attempt: &mut ClipAttempt,
        clip_id: &str,
        frames: &[ExtractedFrame],
    ) -> CoreResult<()> {
        let output_dir = &self.config.frame_output_dir;
        fs::create_dir_all(output_dir)?;

        for (index, frame) in frames.iter().enumerate() {
            let started = std::time::Instant::now();
            let path = output_dir.join(frame_file_name(clip_id, index + 1));
            frame.image.save_with_format(&path, ImageFormat::Jpeg)?;
            log::debug!(
                "Saved frame {} ({}x{}) in {}",
                path.display(),
                frame.width(),
                frame.height(),
                format_elapsed(started.elapsed())
            );
            attempt.push_frame_path(path);
        }
        Ok(())
    }
}

/// Removes frame images a failed clip already wrote, so a failed result
/// never points at artifacts.
fn discard_frames(attempt: &mut ClipAttempt) {
    for path in attempt.take_frame_paths() {
        match remove_if_present(&path) {
            Ok(true) => log::debug!("Removed frame of failed clip: {}", path.display()),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}
