// ============================================================================
// clipscreen-core/src/download/mod.rs
// ============================================================================
//
// RATE-LIMITED DOWNLOADER: Size-bounded streaming of remote clips to disk
//
// Downloads a remote video into a local file while enforcing three limits:
// the URL must be a well-formed http(s) URL, no more than N downloads may
// start within a rolling window, and the file may never hold more than the
// byte ceiling. The ceiling is checked twice: once against the size the
// server advertises, and again before every chunk is written.
//
// KEY COMPONENTS:
// - Downloader: the download engine, generic over HttpTransport
// - DownloadSpec / DownloadReport: per-clip request and outcome
// - RateLimiter: rolling-window admission of download starts

mod rate_limit;
mod transport;

pub use rate_limit::RateLimiter;
pub use transport::{HttpTransport, ReqwestTransport, map_read_error, map_reqwest_error};

// ---- Standard library imports ----
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ---- External crate imports ----
use url::Url;

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::pipeline::CancellationToken;
use crate::progress::ProgressObserver;
use crate::temp_files::remove_if_present;
use crate::utils::{format_bytes, format_elapsed};

/// Everything needed to download one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    pub url: String,
    pub local_path: PathBuf,
    pub max_bytes: u64,
}

impl DownloadSpec {
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
            max_bytes,
        }
    }
}

/// Outcome of a completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes_written: u64,
    /// Size advertised by the server before the transfer, if any.
    pub expected_size: Option<u64>,
    pub elapsed: Duration,
}

/// Parses `raw` and accepts it only as an http or https URL with a host.
pub fn validate_url(raw: &str) -> CoreResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput("URL is empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| CoreError::InvalidInput(format!("malformed URL '{trimmed}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CoreError::InvalidInput(format!(
                "unsupported URL scheme '{other}' in '{trimmed}'"
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(CoreError::InvalidInput(format!("URL '{trimmed}' has no host")));
    }

    Ok(url)
}

/// Streams remote files to disk under a size ceiling and a start-rate limit.
#[derive(Debug)]
pub struct Downloader<T: HttpTransport> {
    transport: T,
    limiter: RateLimiter,
    chunk_size: usize,
    max_bytes: u64,
    cancel: CancellationToken,
}

impl Downloader<ReqwestTransport> {
    /// Builds a reqwest-backed downloader from the core configuration.
    pub fn from_config(config: &CoreConfig) -> CoreResult<Self> {
        let transport =
            ReqwestTransport::new(config.connect_timeout, config.read_timeout, &config.user_agent)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> Downloader<T> {
    pub fn new(transport: T, limiter: RateLimiter, chunk_size: usize, max_bytes: u64) -> Self {
        Self {
            transport,
            limiter,
            chunk_size,
            max_bytes,
            cancel: CancellationToken::new(),
        }
    }

    /// Shares `token` with the download loop, which stops between chunks
    /// once it is cancelled.
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancel = token;
    }

    /// Builds a downloader over `transport` with limits taken from `config`.
    pub fn with_transport(transport: T, config: &CoreConfig) -> Self {
        Self::new(
            transport,
            RateLimiter::new(config.rate_limit_calls, config.rate_limit_period),
            config.download_chunk_size,
            config.max_download_bytes,
        )
    }

    /// Default byte ceiling applied by `download_spec` callers.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Structural readiness: every limit is usable.
    pub fn is_ready(&self) -> bool {
        self.chunk_size > 0 && self.max_bytes > 0 && self.limiter.max_calls() > 0
    }

    /// Downloads according to `spec`.
    pub fn download_spec(
        &self,
        spec: &DownloadSpec,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<DownloadReport> {
        self.download(&spec.url, &spec.local_path, spec.max_bytes, progress)
    }

    /// Downloads `url` into `local_path`, writing at most `max_bytes`.
    ///
    /// The URL is validated before any network activity. On a size breach,
    /// or on any failure before the first byte was written, the partial file
    /// is removed. Other failures leave the partial file for the caller's
    /// cleanup guard.
    pub fn download(
        &self,
        url: &str,
        local_path: &Path,
        max_bytes: u64,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<DownloadReport> {
        let parsed = validate_url(url)?;
        if max_bytes == 0 {
            return Err(CoreError::InvalidInput(
                "maximum download size must be greater than zero".to_string(),
            ));
        }

        self.limiter.acquire();
        self.cancel.check()?;
        let started = Instant::now();
        log::info!("Starting download: {parsed}");

        let expected_size = self.preflight_size(&parsed, max_bytes)?;

        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut bytes_written = 0u64;
        let result = self
            .transport
            .open(&parsed)
            .and_then(|body| {
                self.stream_to_file(body, local_path, max_bytes, expected_size, &mut bytes_written, progress)
            });

        if let Err(e) = result {
            if bytes_written == 0 || matches!(e, CoreError::SizeExceeded { .. }) {
                match remove_if_present(local_path) {
                    Ok(true) => log::debug!("Removed partial download {}", local_path.display()),
                    Ok(false) => {}
                    Err(rm) => log::warn!(
                        "Failed to remove partial download {}: {rm}",
                        local_path.display()
                    ),
                }
            }
            log::error!("Download failed for {parsed}: {e}");
            return Err(e);
        }

        let elapsed = started.elapsed();
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            format!("{}/s", format_bytes((bytes_written as f64 / secs) as u64))
        } else {
            "n/a".to_string()
        };
        log::info!(
            "Download completed: {} in {} ({throughput}) -> {}",
            format_bytes(bytes_written),
            format_elapsed(elapsed),
            local_path.display()
        );

        Ok(DownloadReport {
            bytes_written,
            expected_size,
            elapsed,
        })
    }

    /// Asks the server for the body size and rejects it early when it is
    /// over the ceiling. A failed or inconclusive check is not fatal.
    fn preflight_size(&self, url: &Url, max_bytes: u64) -> CoreResult<Option<u64>> {
        match self.transport.content_length(url) {
            Ok(Some(size)) if size > max_bytes => {
                log::warn!(
                    "Remote file is {} which exceeds the {} limit",
                    format_bytes(size),
                    format_bytes(max_bytes)
                );
                Err(CoreError::SizeExceeded {
                    actual: size,
                    limit: max_bytes,
                })
            }
            Ok(Some(size)) => {
                log::debug!("Remote file size: {}", format_bytes(size));
                Ok(Some(size))
            }
            Ok(None) => {
                log::warn!("Server did not report a content length for {url}");
                Ok(None)
            }
            Err(e) => {
                log::warn!("Could not check file size for {url}: {e}");
                Ok(None)
            }
        }
    }

    fn stream_to_file(
        &self,
        mut body: T::Body,
        local_path: &Path,
        max_bytes: u64,
        expected_size: Option<u64>,
        bytes_written: &mut u64,
        progress: &dyn ProgressObserver,
    ) -> CoreResult<()> {
        let mut file = File::create(local_path)?;
        let mut buffer = vec![0u8; self.chunk_size.max(1)];

        loop {
            self.cancel.check()?;
            let read = match body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_read_error(e)),
            };

            let next_total = *bytes_written + read as u64;
            if next_total > max_bytes {
                log::warn!(
                    "Download exceeded maximum file size of {}",
                    format_bytes(max_bytes)
                );
                return Err(CoreError::SizeExceeded {
                    actual: next_total,
                    limit: max_bytes,
                });
            }

            file.write_all(&buffer[..read])?;
            *bytes_written = next_total;
            progress.on_download(*bytes_written, expected_size);
        }

        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("http://example.com/a.mp4").is_ok());
        assert!(validate_url("https://cdn.example.com:8443/v/a.mov?sig=1").is_ok());
    }

    #[test]
    fn rejects_malformed_and_foreign_schemes() {
        for raw in ["", "   ", "not a url", "ftp://example.com/a.mp4", "file:///tmp/a.mp4", "https://"] {
            let err = validate_url(raw).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn spec_carries_its_fields() {
        let spec = DownloadSpec::new("https://x.test/a.mp4", "/tmp/a.mp4", 10);
        assert_eq!(spec.url, "https://x.test/a.mp4");
        assert_eq!(spec.local_path, PathBuf::from("/tmp/a.mp4"));
        assert_eq!(spec.max_bytes, 10);
    }
}
