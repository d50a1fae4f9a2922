// ============================================================================
// clipscreen-core/src/frames/mod.rs
// ============================================================================
//
// FRAME EXTRACTION: Representative stills at fractions of a video's duration
//
// Given a local video and a set of time fractions, FrameExtractor validates
// its inputs, opens the video once through a VideoDecoder, and returns one
// RGB raster per fraction in input order. Any frame that cannot be produced
// fails the whole call; no partial results are returned.
//
// KEY COMPONENTS:
// - FrameExtractor: validation and extraction logic
// - FramePercentageSet: validated, ordered time fractions
// - ExtractedFrame / VideoInfo: extraction outputs
// - VideoDecoder / DecoderSession / SessionGuard: decoder seam (decoder.rs)
// - FfmpegDecoder: ffprobe + ffmpeg-sidecar decoder (ffmpeg.rs)

mod decoder;
mod ffmpeg;

pub use decoder::{DecoderSession, PixelLayout, RawFrame, SessionGuard, VideoDecoder};
pub use ffmpeg::{END_SEEK_MARGIN_SECS, FfmpegDecoder, FfmpegSession};

// ---- Standard library imports ----
use std::fs;
use std::io;
use std::path::Path;

// ---- External crate imports ----
use image::RgbImage;
use serde::Serialize;

// ---- Internal crate imports ----
use crate::config::DEFAULT_FRAME_PERCENTAGES;
use crate::error::{CoreError, CoreResult};
use crate::progress::ProgressObserver;
use crate::utils::format_duration;

/// Ordered, non-empty time fractions, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePercentageSet(Vec<f64>);

impl FramePercentageSet {
    pub fn new(percentages: Vec<f64>) -> CoreResult<Self> {
        if percentages.is_empty() {
            return Err(CoreError::InvalidInput(
                "frame percentages must not be empty".to_string(),
            ));
        }
        if let Some(bad) = percentages.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(CoreError::InvalidInput(format!(
                "frame percentage {bad} is outside [0.0, 1.0]"
            )));
        }
        Ok(Self(percentages))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FramePercentageSet {
    fn default() -> Self {
        Self(DEFAULT_FRAME_PERCENTAGES.to_vec())
    }
}

/// A decoded still with the position it was taken from.
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub image: RgbImage,
    pub timestamp_secs: f64,
    pub percentage: f64,
}

impl ExtractedFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Basic properties of a video file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub filename: String,
}

/// Extracts frames at time fractions through a `VideoDecoder`.
#[derive(Debug)]
pub struct FrameExtractor<D: VideoDecoder> {
    decoder: D,
    default_percentages: FramePercentageSet,
}

impl FrameExtractor<FfmpegDecoder> {
    /// Extractor over the ffmpeg decoder with the given default fractions.
    pub fn ffmpeg(default_percentages: FramePercentageSet) -> Self {
        Self::new(FfmpegDecoder::new(), default_percentages)
    }
}

impl<D: VideoDecoder> FrameExtractor<D> {
    pub fn new(decoder: D, default_percentages: FramePercentageSet) -> Self {
        Self {
            decoder,
            default_percentages,
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn default_percentages(&self) -> &FramePercentageSet {
        &self.default_percentages
    }

    /// Structural readiness: a usable default set and a decoder whose
    /// external tools are present.
    pub fn is_ready(&self) -> bool {
        !self.default_percentages.is_empty() && self.decoder.is_available()
    }

    /// Extracts one frame per entry of `percentages`, in order.
    pub fn extract(
        &self,
        video_path: &Path,
        percentages: &[f64],
        progress: &dyn ProgressObserver,
    ) -> CoreResult<Vec<ExtractedFrame>> {
        validate_video_file(video_path)?;
        let percentages = FramePercentageSet::new(percentages.to_vec())?;

        let mut session = SessionGuard::new(self.decoder.open(video_path)?);
        let duration = checked_duration(session.duration(), video_path)?;
        log::debug!(
            "Extracting {} frames from {} (duration {})",
            percentages.len(),
            video_path.display(),
            format_duration(duration)
        );

        let total = percentages.len();
        let mut frames = Vec::with_capacity(total);
        for (index, &percentage) in percentages.as_slice().iter().enumerate() {
            let timestamp = duration * percentage;
            let raw = session.frame_at(timestamp)?.ok_or_else(|| {
                CoreError::ExtractionFailed(format!(
                    "no frame decoded at {:.0}% ({timestamp:.2}s) of {}",
                    percentage * 100.0,
                    video_path.display()
                ))
            })?;
            if raw.is_empty() {
                return Err(CoreError::ExtractionFailed(format!(
                    "empty frame decoded at {:.0}% of {}",
                    percentage * 100.0,
                    video_path.display()
                )));
            }

            let image = raw.into_rgb().map_err(|e| {
                CoreError::ExtractionFailed(format!("frame at {:.0}%: {e}", percentage * 100.0))
            })?;
            frames.push(ExtractedFrame {
                image,
                timestamp_secs: timestamp,
                percentage,
            });
            progress.on_frame(index + 1, total, percentage);
        }

        session.close();
        log::info!(
            "Extracted {} frames from {}",
            frames.len(),
            video_path.display()
        );
        Ok(frames)
    }

    /// Extracts frames at the configured default fractions.
    pub fn extract_default(
        &self,
        video_path: &Path,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<Vec<ExtractedFrame>> {
        self.extract(video_path, self.default_percentages.as_slice(), progress)
    }

    /// Extracts the frame at an absolute timestamp in seconds.
    pub fn extract_single(&self, video_path: &Path, timestamp: f64) -> CoreResult<ExtractedFrame> {
        validate_video_file(video_path)?;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "timestamp {timestamp} must be a non-negative number of seconds"
            )));
        }

        let mut session = SessionGuard::new(self.decoder.open(video_path)?);
        let duration = checked_duration(session.duration(), video_path)?;
        if timestamp > duration {
            return Err(CoreError::InvalidInput(format!(
                "timestamp {timestamp:.2}s is beyond the video duration {duration:.2}s"
            )));
        }

        let raw = session.frame_at(timestamp)?.ok_or_else(|| {
            CoreError::ExtractionFailed(format!(
                "no frame decoded at {timestamp:.2}s of {}",
                video_path.display()
            ))
        })?;
        let image = raw.into_rgb()?;
        session.close();

        Ok(ExtractedFrame {
            image,
            timestamp_secs: timestamp,
            percentage: timestamp / duration,
        })
    }

    /// Reads duration, dimensions, size and name of a video.
    pub fn video_info(&self, video_path: &Path) -> CoreResult<VideoInfo> {
        let file_size = validate_video_file(video_path)?;
        let session = SessionGuard::new(self.decoder.open(video_path)?);
        let (width, height) = session.dimensions().unwrap_or((0, 0));

        let info = VideoInfo {
            duration: session.duration(),
            width,
            height,
            file_size,
            filename: video_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        session.close();
        Ok(info)
    }
}

/// Checks that `path` is a non-empty regular file. Returns its size.
fn validate_video_file(path: &Path) -> CoreResult<u64> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            CoreError::NotFound(format!("video file not found: {}", path.display()))
        }
        _ => CoreError::Io(e),
    })?;

    if !metadata.is_file() {
        return Err(CoreError::InvalidInput(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    if metadata.len() == 0 {
        return Err(CoreError::InvalidInput(format!(
            "video file is empty: {}",
            path.display()
        )));
    }
    Ok(metadata.len())
}

fn checked_duration(duration: f64, path: &Path) -> CoreResult<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(CoreError::InvalidState(format!(
            "invalid video duration {duration} for {}",
            path.display()
        )));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_set_rejects_empty_and_out_of_range() {
        assert!(FramePercentageSet::new(vec![]).is_err());
        assert!(FramePercentageSet::new(vec![0.5, 1.01]).is_err());
        assert!(FramePercentageSet::new(vec![-0.1]).is_err());
        assert!(FramePercentageSet::new(vec![f64::NAN]).is_err());
        assert!(FramePercentageSet::new(vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn percentage_set_keeps_order() {
        let set = FramePercentageSet::new(vec![0.9, 0.1, 0.5]).unwrap();
        assert_eq!(set.as_slice(), &[0.9, 0.1, 0.5]);
        assert_eq!(FramePercentageSet::default().as_slice(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn duration_must_be_positive_and_finite() {
        let path = Path::new("clip.mp4");
        assert!(matches!(checked_duration(0.0, path), Err(CoreError::InvalidState(_))));
        assert!(matches!(checked_duration(f64::INFINITY, path), Err(CoreError::InvalidState(_))));
        assert_eq!(checked_duration(12.5, path).unwrap(), 12.5);
    }
}
