//! HTTP client for a joint image-text embedding service.
//!
//! The service exposes two JSON endpoints under a base URL:
//! `POST {base}/embed/image` with `{"image": "<base64 PNG>"}` and
//! `POST {base}/embed/text` with `{"text": "<word>"}`. Both answer with
//! `{"embedding": [f32, ...]}`.

use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbImage};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::EmbeddingModel;
use crate::error::{CoreError, CoreResult};

/// Blocking embeddings client for the image/text embedding service.
#[derive(Debug, Clone)]
pub struct RemoteEmbeddingModel {
    client: Client,
    image_endpoint: String,
    text_endpoint: String,
}

impl RemoteEmbeddingModel {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> CoreResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(CoreError::Config("embedding service URL is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let auth = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| CoreError::Config("invalid embedding service API key".to_string()))?;
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build embedding HTTP client: {e}")))?;

        Ok(Self {
            client,
            image_endpoint: format!("{base}/embed/image"),
            text_endpoint: format!("{base}/embed/text"),
        })
    }

    fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> CoreResult<Vec<f32>> {
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .map_err(|e| CoreError::EmbeddingFailed(format!("request to {endpoint} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(CoreError::EmbeddingFailed(format!(
                "{endpoint} returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().map_err(|e| {
            CoreError::EmbeddingFailed(format!("invalid embedding response from {endpoint}: {e}"))
        })?;
        if parsed.embedding.is_empty() {
            return Err(CoreError::EmbeddingFailed(format!(
                "{endpoint} returned an empty embedding"
            )));
        }
        Ok(parsed.embedding)
    }
}

impl EmbeddingModel for RemoteEmbeddingModel {
    fn embed_image(&self, image: &RgbImage) -> CoreResult<Vec<f32>> {
        let encoded = encode_png_base64(image)?;
        self.post(&self.image_endpoint, &ImageRequest { image: &encoded })
    }

    fn embed_text(&self, text: &str) -> CoreResult<Vec<f32>> {
        self.post(&self.text_endpoint, &TextRequest { text })
    }
}

/// PNG-encodes `image` and returns it as standard base64.
pub fn encode_png_base64(image: &RgbImage) -> CoreResult<String> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(BASE64.encode(bytes))
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: &'a str,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}
