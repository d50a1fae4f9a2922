// ============================================================================
// clipscreen-core/src/gateway/mod.rs
// ============================================================================
//
// METADATA GATEWAY: Access to the clip records to be processed
//
// The pipeline does not know where clip records live. It asks a
// MetadataGateway to list them, to fetch one by id, and to report whether
// the store is reachable. Listing failures abort a batch; a missing id is
// `Ok(None)`, not an error.
//
// KEY COMPONENTS:
// - ClipRecord: id, title and source URL of a clip
// - MetadataGateway: trait used by the pipeline
// - InMemoryGateway: fixed list of records
// - ManifestGateway: JSON manifest file (manifest.rs)
// - RestGateway: PostgREST-style table endpoint (rest.rs)

mod manifest;
mod rest;

pub use manifest::ManifestGateway;
pub use rest::{DEFAULT_CLIP_TABLE, RestGateway};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreResult;

fn default_title() -> String {
    "Unknown".to_string()
}

/// A clip as supplied by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreRow")]
pub struct ClipRecord {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
}

/// A store row as it arrives. Stores name the source column `clip_path`,
/// `source_url` or `url`, sometimes more than one of them on the same row.
#[derive(Deserialize)]
struct StoreRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,

    #[serde(default = "default_title", deserialize_with = "deserialize_title")]
    title: String,

    #[serde(default)]
    clip_path: Option<String>,

    #[serde(default)]
    source_url: Option<String>,

    #[serde(default)]
    url: Option<String>,
}

impl From<StoreRow> for ClipRecord {
    fn from(row: StoreRow) -> Self {
        let candidates = [row.clip_path, row.source_url, row.url];
        // clip_path wins; a blank column gives way to the next non-blank one.
        let source_url = candidates
            .iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
            .or_else(|| candidates.iter().flatten().next())
            .cloned();
        Self {
            id: row.id,
            title: row.title,
            source_url,
        }
    }
}

impl ClipRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, source_url: Option<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source_url,
        }
    }

    /// The source URL, when present and not blank.
    pub fn url(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Store ids are sometimes numeric; either form becomes a string.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "clip id must be a string or number, got {other}"
        ))),
    }
}

fn deserialize_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(default_title))
}

/// Source of clip records.
pub trait MetadataGateway {
    /// Every clip to process, in processing order.
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>>;

    /// The clip with `id`, or `None` when the store has no such clip.
    fn get_clip(&self, id: &str) -> CoreResult<Option<ClipRecord>>;

    /// Whether the store is reachable.
    fn check_connection(&self) -> bool;
}

/// Gateway over a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    clips: Vec<ClipRecord>,
}

impl InMemoryGateway {
    pub fn new(clips: Vec<ClipRecord>) -> Self {
        Self { clips }
    }

    pub fn clips(&self) -> &[ClipRecord] {
        &self.clips
    }
}

impl MetadataGateway for InMemoryGateway {
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>> {
        Ok(self.clips.clone())
    }

    fn get_clip(&self, id: &str) -> CoreResult<Option<ClipRecord>> {
        Ok(self.clips.iter().find(|clip| clip.id == id).cloned())
    }

    fn check_connection(&self) -> bool {
        true
    }
}
