//! Mock collaborators shared by the integration tests.
//!
//! Each mock records how it was called so tests can assert on interaction
//! as well as on results.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use clipscreen_core::error::{CoreError, CoreResult};
use clipscreen_core::frames::{DecoderSession, RawFrame, VideoDecoder};
use clipscreen_core::gateway::{ClipRecord, MetadataGateway};
use clipscreen_core::moderation::EmbeddingModel;
use clipscreen_core::{CoreConfig, CoreConfigBuilder, HttpTransport};
use image::RgbImage;
use url::Url;

// ---- Transport ----

#[derive(Debug, Clone)]
pub enum MockBody {
    Bytes(Vec<u8>),
    /// Streams this many zero bytes.
    Zeros(u64),
    /// Streams `bytes` zero bytes, then fails with `kind`.
    FailAfter { bytes: u64, kind: io::ErrorKind },
    /// The request itself fails.
    OpenFails(MockFailure),
}

#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    Timeout,
    Status(u16),
}

impl MockFailure {
    fn to_error(self) -> CoreError {
        match self {
            MockFailure::Timeout => CoreError::Timeout("GET request timed out".to_string()),
            MockFailure::Status(code) => {
                CoreError::NetworkError(format!("GET request returned HTTP {code}"))
            }
        }
    }
}

#[derive(Debug)]
pub struct MockTransport {
    /// Result of the size check: `Ok(size)` or an error message.
    pub head: Result<Option<u64>, String>,
    pub body: MockBody,
    pub head_calls: Cell<usize>,
    pub open_calls: Cell<usize>,
    pub opened: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn new(head: Option<u64>, body: MockBody) -> Self {
        Self {
            head: Ok(head),
            body,
            head_calls: Cell::new(0),
            open_calls: Cell::new(0),
            opened: RefCell::new(Vec::new()),
        }
    }

    /// Serves `bytes` with an accurate content length.
    pub fn serving(bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self::new(Some(len), MockBody::Bytes(bytes))
    }

    pub fn with_failing_head(mut self, message: &str) -> Self {
        self.head = Err(message.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.head_calls.get() + self.open_calls.get()
    }
}

impl HttpTransport for MockTransport {
    type Body = Box<dyn Read>;

    fn content_length(&self, _url: &Url) -> CoreResult<Option<u64>> {
        self.head_calls.set(self.head_calls.get() + 1);
        self.head
            .clone()
            .map_err(CoreError::NetworkError)
    }

    fn open(&self, url: &Url) -> CoreResult<Box<dyn Read>> {
        self.open_calls.set(self.open_calls.get() + 1);
        self.opened.borrow_mut().push(url.to_string());
        match &self.body {
            MockBody::Bytes(bytes) => Ok(Box::new(io::Cursor::new(bytes.clone()))),
            MockBody::Zeros(len) => Ok(Box::new(io::repeat(0).take(*len))),
            MockBody::FailAfter { bytes, kind } => Ok(Box::new(FailingReader {
                remaining: *bytes,
                kind: *kind,
            })),
            MockBody::OpenFails(failure) => Err(failure.to_error()),
        }
    }
}

struct FailingReader {
    remaining: u64,
    kind: io::ErrorKind,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(self.kind, "mock stream failure"));
        }
        let n = buf.len().min(self.remaining as usize);
        buf[..n].fill(0);
        self.remaining -= n as u64;
        Ok(n)
    }
}

// ---- Decoder ----

#[derive(Debug, Default)]
pub struct DecoderLog {
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub requested: RefCell<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct MockDecoder {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    /// 0-based frame request that yields no frame.
    pub missing_frame: Option<usize>,
    /// 0-based frame request that yields a truncated buffer.
    pub corrupt_frame: Option<usize>,
    pub available: bool,
    pub log: Rc<DecoderLog>,
}

impl MockDecoder {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            width: 8,
            height: 6,
            missing_frame: None,
            corrupt_frame: None,
            available: true,
            log: Rc::new(DecoderLog::default()),
        }
    }
}

impl VideoDecoder for MockDecoder {
    type Session = MockSession;

    fn open(&self, path: &Path) -> CoreResult<MockSession> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.display().to_string()));
        }
        self.log.opens.set(self.log.opens.get() + 1);
        Ok(MockSession {
            decoder: self.clone(),
            requests: 0,
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[derive(Debug)]
pub struct MockSession {
    decoder: MockDecoder,
    requests: usize,
}

impl DecoderSession for MockSession {
    fn duration(&self) -> f64 {
        self.decoder.duration
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.decoder.width, self.decoder.height))
    }

    fn frame_at(&mut self, timestamp: f64) -> CoreResult<Option<RawFrame>> {
        let request = self.requests;
        self.requests += 1;
        self.decoder.log.requested.borrow_mut().push(timestamp);

        if self.decoder.missing_frame == Some(request) {
            return Ok(None);
        }

        let (w, h) = (self.decoder.width, self.decoder.height);
        let shade = (timestamp * 10.0).min(255.0) as u8;
        let mut data = vec![shade; (w * h * 3) as usize];
        if self.decoder.corrupt_frame == Some(request) {
            data.truncate(data.len() / 2);
        }
        Ok(Some(RawFrame::rgb(w, h, data)))
    }

    fn close(&mut self) {
        let closes = &self.decoder.log.closes;
        closes.set(closes.get() + 1);
    }
}

// ---- Embedding model ----

#[derive(Debug, Default)]
pub struct MockEmbeddingModel {
    pub words: HashMap<String, Vec<f32>>,
    pub image_embedding: Vec<f32>,
    pub fail_images: bool,
    pub text_calls: Cell<usize>,
    pub image_calls: Cell<usize>,
}

impl MockEmbeddingModel {
    pub fn new(words: &[(&str, &[f32])], image_embedding: &[f32]) -> Self {
        Self {
            words: words
                .iter()
                .map(|(word, embedding)| (word.to_string(), embedding.to_vec()))
                .collect(),
            image_embedding: image_embedding.to_vec(),
            ..Self::default()
        }
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    fn embed_image(&self, _image: &RgbImage) -> CoreResult<Vec<f32>> {
        self.image_calls.set(self.image_calls.get() + 1);
        if self.fail_images {
            return Err(CoreError::EmbeddingFailed("model unavailable".to_string()));
        }
        Ok(self.image_embedding.clone())
    }

    fn embed_text(&self, text: &str) -> CoreResult<Vec<f32>> {
        self.text_calls.set(self.text_calls.get() + 1);
        self.words
            .get(text)
            .cloned()
            .ok_or_else(|| CoreError::EmbeddingFailed(format!("no embedding for '{text}'")))
    }
}

// ---- Gateway ----

/// Gateway whose store is unreachable.
#[derive(Debug, Default)]
pub struct UnreachableGateway;

impl MetadataGateway for UnreachableGateway {
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>> {
        Err(CoreError::Gateway("connection refused".to_string()))
    }

    fn get_clip(&self, _id: &str) -> CoreResult<Option<ClipRecord>> {
        Err(CoreError::Gateway("connection refused".to_string()))
    }

    fn check_connection(&self) -> bool {
        false
    }
}

// ---- Helpers ----

/// Writes a small non-empty stand-in video file.
pub fn fake_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"not really a video, the mock decoder never reads it").unwrap();
    path
}

/// Config rooted in `root` with a generous rate limit.
pub fn test_config(root: &Path) -> CoreConfig {
    CoreConfigBuilder::new()
        .temp_dir(root.join("tmp"))
        .frame_output_dir(root.join("frames"))
        .rate_limit(100, Duration::from_secs(60))
        .build()
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
