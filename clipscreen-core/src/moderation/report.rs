//! Per-clip moderation report written as pretty JSON next to the frames.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModerationVerdict;
use crate::error::CoreResult;
use crate::utils::sanitize_file_stem;

/// Moderation outcome of one extracted frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameModeration {
    /// 1-based, matching the frame artifact index.
    pub index: usize,
    pub percentage: f64,
    pub timestamp_secs: f64,
    pub verdict: ModerationVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationReport {
    pub clip_id: String,
    pub clip_title: String,
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub flagged: bool,
    pub frames_analyzed: usize,
    pub frames: Vec<FrameModeration>,
}

impl ModerationReport {
    pub fn new(
        clip_id: impl Into<String>,
        clip_title: impl Into<String>,
        threshold: f64,
        frames: Vec<FrameModeration>,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            clip_title: clip_title.into(),
            generated_at: Utc::now(),
            threshold,
            flagged: frames.iter().any(|f| f.verdict.flagged),
            frames_analyzed: frames.len(),
            frames,
        }
    }

    /// Writes the report into `dir` and returns the file path.
    pub fn write_to_dir(&self, dir: &Path) -> CoreResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(report_file_name(&self.clip_id));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Wrote moderation report {}", path.display());
        Ok(path)
    }

    pub fn read_from(path: &Path) -> CoreResult<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

pub fn report_file_name(clip_id: &str) -> String {
    format!("{}_moderation.json", sanitize_file_stem(clip_id))
}
