// ============================================================================
// clipscreen-core/src/frames/decoder.rs
// ============================================================================
//
// VIDEO DECODER ABSTRACTION: Timestamp-addressed frame access
//
// The frame extractor never decodes video itself. It opens a session on an
// external decoder, asks it for the duration and for frames at timestamps,
// and closes it again. These traits are the seam between the two, so tests
// can substitute scripted decoders for ffmpeg.
//
// KEY COMPONENTS:
// - VideoDecoder / DecoderSession: decoder traits
// - RawFrame / PixelLayout: decoder output before conversion
// - SessionGuard: closes a session on every exit path

use std::ops::{Deref, DerefMut};
use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::{CoreError, CoreResult};

/// Pixel layouts a decoder may hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb24,
    Bgr24,
    Rgba32,
    Gray8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb24 | PixelLayout::Bgr24 => 3,
            PixelLayout::Rgba32 => 4,
            PixelLayout::Gray8 => 1,
        }
    }
}

/// A decoded frame as produced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout: PixelLayout::Rgb24,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Converts to an 8-bit RGB raster. Zero-area frames and buffers whose
    /// length disagrees with the dimensions are rejected.
    pub fn into_rgb(self) -> CoreResult<RgbImage> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::ExtractionFailed(format!(
                "decoded frame has zero area ({}x{})",
                self.width, self.height
            )));
        }

        let expected = self.width as usize * self.height as usize * self.layout.bytes_per_pixel();
        if self.data.len() != expected {
            return Err(CoreError::ExtractionFailed(format!(
                "decoded {}x{} {:?} frame has {} bytes, expected {}",
                self.width,
                self.height,
                self.layout,
                self.data.len(),
                expected
            )));
        }

        let (width, height) = (self.width, self.height);
        let image = match self.layout {
            PixelLayout::Rgb24 => RgbImage::from_raw(width, height, self.data),
            PixelLayout::Bgr24 => {
                let mut data = self.data;
                for pixel in data.chunks_exact_mut(3) {
                    pixel.swap(0, 2);
                }
                RgbImage::from_raw(width, height, data)
            }
            PixelLayout::Rgba32 => RgbaImage::from_raw(width, height, self.data)
                .map(|rgba| DynamicImage::ImageRgba8(rgba).to_rgb8()),
            PixelLayout::Gray8 => GrayImage::from_raw(width, height, self.data)
                .map(|gray| DynamicImage::ImageLuma8(gray).to_rgb8()),
        };

        image.ok_or_else(|| {
            CoreError::ExtractionFailed(format!("could not build {width}x{height} raster"))
        })
    }
}

/// An open video.
pub trait DecoderSession {
    /// Total duration in seconds as reported by the container.
    fn duration(&self) -> f64;

    /// Frame dimensions, when known.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Decodes the frame shown at `timestamp` seconds. `Ok(None)` means the
    /// decoder produced nothing for that position.
    fn frame_at(&mut self, timestamp: f64) -> CoreResult<Option<RawFrame>>;

    /// Releases the session's resources. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Opens decoder sessions on local video files.
pub trait VideoDecoder {
    type Session: DecoderSession;

    fn open(&self, path: &Path) -> CoreResult<Self::Session>;

    /// Whether the decoder's external dependencies are present.
    fn is_available(&self) -> bool {
        true
    }
}

/// Owns a decoder session and closes it when dropped, unless it was closed
/// explicitly first.
pub struct SessionGuard<S: DecoderSession> {
    session: S,
    closed: bool,
}

impl<S: DecoderSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub fn close(mut self) {
        self.session.close();
        self.closed = true;
    }
}

impl<S: DecoderSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: DecoderSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: DecoderSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if !self.closed {
            self.session.close();
        }
    }
}
