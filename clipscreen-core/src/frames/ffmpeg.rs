// clipscreen-core/src/frames/ffmpeg.rs
//
// VideoDecoder backed by the ffprobe and ffmpeg executables. Probing goes
// through the `ffprobe` crate; each frame is a single ffmpeg invocation
// (via `ffmpeg-sidecar`) that seeks to the timestamp and emits one rgb24
// rawvideo frame on stdout.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::{FfmpegCommand, ffmpeg_is_installed};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffprobe::{FfProbeError, ffprobe};

use super::decoder::{DecoderSession, RawFrame, VideoDecoder};
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};

/// Seeks at or past the end are pulled back by this many seconds so the
/// final position still lands on a decodable frame.
pub const END_SEEK_MARGIN_SECS: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl VideoDecoder for FfmpegDecoder {
    type Session = FfmpegSession;

    fn open(&self, path: &Path) -> CoreResult<FfmpegSession> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                CoreError::NotFound(format!("video file not found: {}", path.display()))
            }
            _ => CoreError::Io(e),
        })?;

        log::debug!("Running ffprobe on {}", path.display());
        let metadata = ffprobe(path).map_err(|e| map_ffprobe_error(e, path))?;

        let duration = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        let dimensions = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| match (s.width, s.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some((w as u32, h as u32)),
                _ => None,
            });

        if dimensions.is_none() {
            log::warn!("No usable video stream dimensions in {}", path.display());
        }

        Ok(FfmpegSession {
            path: path.to_path_buf(),
            file: Some(file),
            duration,
            dimensions,
        })
    }

    fn is_available(&self) -> bool {
        ffmpeg_is_installed()
    }
}

/// An ffprobe-inspected video with its file handle held open.
#[derive(Debug)]
pub struct FfmpegSession {
    path: PathBuf,
    file: Option<File>,
    duration: f64,
    dimensions: Option<(u32, u32)>,
}

impl FfmpegSession {
    fn seek_position(&self, timestamp: f64) -> f64 {
        if self.duration > 0.0 && timestamp >= self.duration {
            (self.duration - END_SEEK_MARGIN_SECS).max(0.0)
        } else {
            timestamp.max(0.0)
        }
    }
}

impl DecoderSession for FfmpegSession {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    fn frame_at(&mut self, timestamp: f64) -> CoreResult<Option<RawFrame>> {
        if self.file.is_none() {
            return Err(CoreError::InvalidState(format!(
                "decoder session for {} is closed",
                self.path.display()
            )));
        }

        let seek = self.seek_position(timestamp);
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .seek(format!("{seek:.3}"))
            .input(&*self.path.to_string_lossy())
            .args(["-frames:v", "1", "-an"])
            .rawvideo();

        log::trace!("Decoding frame at {seek:.3}s from {}", self.path.display());
        let mut child = command
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (frame decode)", e))?;

        let events = child.iter().map_err(|e| {
            CoreError::ExtractionFailed(format!("could not read ffmpeg output: {e}"))
        })?;

        let mut frame = None;
        let mut errors = Vec::new();
        for event in events {
            match event {
                FfmpegEvent::OutputFrame(output) if frame.is_none() => {
                    frame = Some(RawFrame::rgb(output.width, output.height, output.data));
                }
                FfmpegEvent::Error(line)
                | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => errors.push(line),
                _ => {}
            }
        }

        let status = child.wait()?;
        if !status.success() {
            let failure = command_failed_error("ffmpeg (frame decode)", status, errors.join("\n"));
            log::warn!("{failure}");
            return Ok(None);
        }

        Ok(frame.filter(|f| !f.is_empty()))
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            log::trace!("Closed decoder session for {}", self.path.display());
        }
    }
}

fn map_ffprobe_error(err: FfProbeError, path: &Path) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe {}", path.display()), output.status, stderr)
        }
        other => CoreError::ExtractionFailed(format!(
            "could not read video metadata from {}: {other:?}",
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(duration: f64) -> FfmpegSession {
        FfmpegSession {
            path: PathBuf::from("clip.mp4"),
            file: None,
            duration,
            dimensions: Some((4, 4)),
        }
    }

    #[test]
    fn seek_at_end_is_pulled_back() {
        let s = session(10.0);
        assert!((s.seek_position(10.0) - (10.0 - END_SEEK_MARGIN_SECS)).abs() < 1e-9);
        assert_eq!(s.seek_position(2.5), 2.5);
        assert_eq!(s.seek_position(-1.0), 0.0);
    }

    #[test]
    fn closed_session_refuses_frames() {
        let mut s = session(10.0);
        assert!(matches!(s.frame_at(1.0), Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = FfmpegDecoder::new()
            .open(Path::new("/definitely/not/here.mp4"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
