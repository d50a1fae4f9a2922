// ============================================================================
// clipscreen-core/src/download/transport.rs
// ============================================================================
//
// HTTP TRANSPORT: Abstraction over the HTTP client used for downloads
//
// The downloader only needs two things from the network: the size a server
// advertises for a resource, and a byte stream of its body. HttpTransport
// names exactly those, so tests can drive the downloader with scripted
// bodies and the binary can use reqwest.
//
// KEY COMPONENTS:
// - HttpTransport: trait used by Downloader
// - ReqwestTransport: blocking reqwest implementation
// - map_read_error: maps body read failures onto Timeout / NetworkError

use std::io::{self, Read};
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, HeaderMap, HeaderValue};
use url::Url;

use crate::error::{CoreError, CoreResult};

/// Network operations required by the downloader.
pub trait HttpTransport {
    type Body: Read;

    /// Size advertised by a metadata-only request, `None` when the server
    /// does not report one.
    fn content_length(&self, url: &Url) -> CoreResult<Option<u64>>;

    /// Starts the transfer and returns the response body.
    fn open(&self, url: &Url) -> CoreResult<Self::Body>;
}

/// Blocking reqwest client with the configured timeouts.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration, user_agent: &str) -> CoreResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl HttpTransport for ReqwestTransport {
    type Body = Response;

    fn content_length(&self, url: &Url) -> CoreResult<Option<u64>> {
        let response = self
            .client
            .head(url.as_str())
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| map_reqwest_error(e, "HEAD"))?;

        // Read the header directly: the body of a HEAD response is always
        // empty, so the body size hint would report zero.
        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok()))
    }

    fn open(&self, url: &Url) -> CoreResult<Response> {
        self.client
            .get(url.as_str())
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| map_reqwest_error(e, "GET"))
    }
}

/// Maps a reqwest failure onto the download error kinds.
pub fn map_reqwest_error(error: reqwest::Error, method: &str) -> CoreError {
    if error.is_timeout() {
        CoreError::Timeout(format!("{method} request timed out: {error}"))
    } else if let Some(status) = error.status() {
        CoreError::NetworkError(format!("{method} request returned HTTP {status}"))
    } else {
        CoreError::NetworkError(format!("{method} request failed: {error}"))
    }
}

/// Maps an error raised while reading a response body.
pub fn map_read_error(error: io::Error) -> CoreError {
    let timed_out = matches!(error.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
        || error
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);

    if timed_out {
        CoreError::Timeout(format!("reading response body: {error}"))
    } else {
        CoreError::NetworkError(format!("reading response body: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_timeouts_map_to_timeout() {
        let err = map_read_error(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(matches!(err, CoreError::Timeout(_)));
    }

    #[test]
    fn other_read_failures_map_to_network_error() {
        let err = map_read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(err, CoreError::NetworkError(_)));
    }

    #[test]
    fn transport_builds_with_defaults() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(10),
            Duration::from_secs(300),
            crate::config::DEFAULT_USER_AGENT,
        );
        assert!(transport.is_ok());
    }
}
