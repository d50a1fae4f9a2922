// ============================================================================
// clipscreen-core/src/pipeline/result.rs
// ============================================================================
//
// PER-CLIP OUTCOMES: Stage tracking and the finalized ProcessingResult
//
// A ClipAttempt is opened when a clip starts and walks the stage machine
// Pending -> Downloading -> Extracting -> (Moderating) -> Finalizing. It is
// consumed by `succeed` or `fail`, which produce the ProcessingResult, so a
// clip cannot be finalized twice.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::error::{CoreError, CoreResult};
use crate::gateway::ClipRecord;
use crate::moderation::FrameModeration;
use crate::utils::format_elapsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClipStage {
    Pending,
    Downloading,
    Extracting,
    Moderating,
    Finalizing,
    Succeeded,
    Failed,
}

impl ClipStage {
    /// Whether the stage machine allows moving from `self` to `next`.
    /// Terminal stages are reached only through finalization.
    pub fn can_advance_to(self, next: ClipStage) -> bool {
        use ClipStage::*;
        matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Extracting)
                | (Extracting, Moderating)
                | (Extracting, Finalizing)
                | (Moderating, Finalizing)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ClipStage::Succeeded | ClipStage::Failed)
    }
}

impl fmt::Display for ClipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipStage::Pending => "pending",
            ClipStage::Downloading => "downloading",
            ClipStage::Extracting => "extracting",
            ClipStage::Moderating => "moderating",
            ClipStage::Finalizing => "finalizing",
            ClipStage::Succeeded => "succeeded",
            ClipStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Finalized outcome of one clip.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub clip_id: String,
    pub clip_title: String,
    pub success: bool,
    /// `Succeeded`, or the stage during which the clip failed.
    pub stage: ClipStage,
    pub frame_paths: Vec<PathBuf>,
    pub error_message: Option<String>,
    pub error_kind: Option<&'static str>,
    #[serde(serialize_with = "serialize_secs")]
    pub processing_time: Duration,
    pub frames_extracted: usize,
    pub moderation: Vec<FrameModeration>,
    pub flagged: bool,
    pub report_path: Option<PathBuf>,
}

impl ProcessingResult {
    /// Stage in which a failed clip stopped.
    pub fn failed_stage(&self) -> Option<ClipStage> {
        (!self.success).then_some(self.stage)
    }
}

/// In-flight state of one clip.
#[derive(Debug)]
pub struct ClipAttempt {
    clip_id: String,
    clip_title: String,
    stage: ClipStage,
    started: Instant,
    frame_paths: Vec<PathBuf>,
    frames_extracted: usize,
    moderation: Vec<FrameModeration>,
    report_path: Option<PathBuf>,
}

impl ClipAttempt {
    pub fn begin(record: &ClipRecord) -> Self {
        Self {
            clip_id: record.id.clone(),
            clip_title: record.title.clone(),
            stage: ClipStage::Pending,
            started: Instant::now(),
            frame_paths: Vec::new(),
            frames_extracted: 0,
            moderation: Vec::new(),
            report_path: None,
        }
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    pub fn clip_title(&self) -> &str {
        &self.clip_title
    }

    pub fn stage(&self) -> ClipStage {
        self.stage
    }

    pub fn advance(&mut self, next: ClipStage) -> CoreResult<()> {
        if !self.stage.can_advance_to(next) {
            return Err(CoreError::InvalidState(format!(
                "clip {} cannot move from {} to {next}",
                self.clip_id, self.stage
            )));
        }
        log::debug!("Clip {}: {} -> {next}", self.clip_id, self.stage);
        self.stage = next;
        Ok(())
    }

    pub fn set_frames_extracted(&mut self, count: usize) {
        self.frames_extracted = count;
    }

    pub fn push_frame_path(&mut self, path: PathBuf) {
        self.frame_paths.push(path);
    }

    /// Hands back the frame paths recorded so far, leaving none behind.
    pub fn take_frame_paths(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.frame_paths)
    }

    pub fn record_moderation(&mut self, frame: FrameModeration) {
        self.moderation.push(frame);
    }

    pub fn moderation(&self) -> &[FrameModeration] {
        &self.moderation
    }

    pub fn set_report_path(&mut self, path: PathBuf) {
        self.report_path = Some(path);
    }

    pub fn succeed(self) -> ProcessingResult {
        let elapsed = self.started.elapsed();
        log::info!(
            "Clip {} succeeded: {} frames in {}",
            self.clip_id,
            self.frame_paths.len(),
            format_elapsed(elapsed)
        );
        self.into_result(ClipStage::Succeeded, None, elapsed)
    }

    pub fn fail(self, error: &CoreError) -> ProcessingResult {
        let elapsed = self.started.elapsed();
        log::error!(
            "Clip {} failed while {}: {error}",
            self.clip_id,
            self.stage
        );
        let stage = self.stage;
        self.into_result(stage, Some(error), elapsed)
    }

    fn into_result(self, stage: ClipStage, error: Option<&CoreError>, elapsed: Duration) -> ProcessingResult {
        let flagged = self.moderation.iter().any(|f| f.verdict.flagged);
        ProcessingResult {
            clip_id: self.clip_id,
            clip_title: self.clip_title,
            success: error.is_none(),
            stage,
            frame_paths: self.frame_paths,
            error_message: error.map(ToString::to_string),
            error_kind: error.map(CoreError::kind),
            processing_time: elapsed,
            frames_extracted: self.frames_extracted,
            moderation: self.moderation,
            flagged,
            report_path: self.report_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ClipRecord {
        ClipRecord::new("c1", "Clip", Some("https://x.test/a.mp4".to_string()))
    }

    #[test]
    fn stages_advance_in_order() {
        let mut attempt = ClipAttempt::begin(&record());
        attempt.advance(ClipStage::Downloading).unwrap();
        attempt.advance(ClipStage::Extracting).unwrap();
        attempt.advance(ClipStage::Finalizing).unwrap();
        let result = attempt.succeed();
        assert!(result.success);
        assert_eq!(result.stage, ClipStage::Succeeded);
        assert!(result.error_message.is_none());
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut attempt = ClipAttempt::begin(&record());
        let err = attempt.advance(ClipStage::Extracting).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(attempt.stage(), ClipStage::Pending);
        assert!(!ClipStage::Finalizing.can_advance_to(ClipStage::Succeeded));
    }

    #[test]
    fn failure_keeps_stage_and_message() {
        let mut attempt = ClipAttempt::begin(&record());
        attempt.advance(ClipStage::Downloading).unwrap();
        let result = attempt.fail(&CoreError::Timeout("GET".into()));
        assert!(!result.success);
        assert_eq!(result.failed_stage(), Some(ClipStage::Downloading));
        assert_eq!(result.error_kind, Some("Timeout"));
        assert!(result.error_message.unwrap().contains("timed out"));
    }
}
