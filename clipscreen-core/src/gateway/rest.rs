//! Clip records served by a PostgREST-style table endpoint.
//!
//! Requests go to `{base}/rest/v1/{table}` with the key sent both as the
//! `apikey` header and as a bearer token, which is what hosted PostgREST
//! deployments (Supabase among them) expect.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

use super::{ClipRecord, MetadataGateway};
use crate::error::{CoreError, CoreResult};

/// Table holding clip records.
pub const DEFAULT_CLIP_TABLE: &str = "media_clips";

#[derive(Debug, Clone)]
pub struct RestGateway {
    client: Client,
    table_url: String,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> CoreResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(CoreError::Config("gateway URL is empty".to_string()));
        }
        let key = api_key.trim();
        if key.is_empty() {
            return Err(CoreError::Config("gateway API key is empty".to_string()));
        }

        let invalid_key = |_: InvalidHeaderValue| {
            CoreError::Config("gateway API key contains invalid characters".to_string())
        };
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(key).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid_key)?,
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build gateway HTTP client: {e}")))?;

        Ok(Self {
            client,
            table_url: format!("{base}/rest/v1/{table}"),
        })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn fetch(&self, query: &[(&str, &str)]) -> CoreResult<Vec<ClipRecord>> {
        let response = self
            .client
            .get(&self.table_url)
            .query(query)
            .send()
            .map_err(|e| CoreError::Gateway(format!("request to {} failed: {e}", self.table_url)))?;
        let response = ensure_success(response)?;
        response
            .json::<Vec<ClipRecord>>()
            .map_err(|e| CoreError::Gateway(format!("invalid clip records: {e}")))
    }
}

fn ensure_success(response: Response) -> CoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(CoreError::Gateway(format!("unexpected status {status}: {body}")))
}

impl MetadataGateway for RestGateway {
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>> {
        let clips = self.fetch(&[("select", "*")])?;
        log::info!("Fetched {} clips from {}", clips.len(), self.table_url);
        Ok(clips)
    }

    fn get_clip(&self, id: &str) -> CoreResult<Option<ClipRecord>> {
        let filter = format!("eq.{id}");
        Ok(self
            .fetch(&[("select", "*"), ("id", filter.as_str())])?
            .into_iter()
            .next())
    }

    fn check_connection(&self) -> bool {
        let result = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .map_err(|e| CoreError::Gateway(e.to_string()))
            .and_then(ensure_success);
        match result {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Metadata gateway connection check failed: {e}");
                false
            }
        }
    }
}
