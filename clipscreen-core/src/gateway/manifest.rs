//! Clip records read from a JSON manifest on disk.
//!
//! The manifest is either a bare array of records or an object with a
//! `clips` array. It is re-read on every call, so edits between runs of a
//! long-lived process are picked up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{ClipRecord, MetadataGateway};
use crate::error::{CoreError, CoreResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    Bare(Vec<ClipRecord>),
    Wrapped { clips: Vec<ClipRecord> },
}

#[derive(Debug, Clone)]
pub struct ManifestGateway {
    path: PathBuf,
}

impl ManifestGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> CoreResult<Vec<ClipRecord>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            CoreError::Gateway(format!("cannot read manifest {}: {e}", self.path.display()))
        })?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|e| {
            CoreError::Gateway(format!("invalid manifest {}: {e}", self.path.display()))
        })?;
        Ok(match manifest {
            Manifest::Bare(clips) | Manifest::Wrapped { clips } => clips,
        })
    }
}

impl MetadataGateway for ManifestGateway {
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>> {
        let clips = self.load()?;
        log::info!("Loaded {} clips from {}", clips.len(), self.path.display());
        Ok(clips)
    }

    fn get_clip(&self, id: &str) -> CoreResult<Option<ClipRecord>> {
        Ok(self.load()?.into_iter().find(|clip| clip.id == id))
    }

    fn check_connection(&self) -> bool {
        match self.load() {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Manifest check failed: {e}");
                false
            }
        }
    }
}
