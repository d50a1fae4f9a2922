//! Advisory component health, as reported by `Pipeline::health_check`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub metadata_gateway: bool,
    pub temp_directory: bool,
    pub downloader: bool,
    pub frame_extractor: bool,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.unhealthy_components().is_empty()
    }

    pub fn components(&self) -> [(&'static str, bool); 4] {
        [
            ("metadata_gateway", self.metadata_gateway),
            ("temp_directory", self.temp_directory),
            ("downloader", self.downloader),
            ("frame_extractor", self.frame_extractor),
        ]
    }

    pub fn unhealthy_components(&self) -> Vec<&'static str> {
        self.components()
            .into_iter()
            .filter(|(_, healthy)| !healthy)
            .map(|(name, _)| name)
            .collect()
    }
}
