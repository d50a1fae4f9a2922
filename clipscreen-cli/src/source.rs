// ============================================================================
// clipscreen-cli/src/source.rs
// ============================================================================
//
// CLIP SOURCE: Runtime choice of metadata gateway
//
// The pipeline is generic over its gateway, but which gateway to use is only
// known after parsing arguments. ClipSource wraps both concrete gateways and
// forwards the MetadataGateway calls to whichever one was selected.
//
// AI-ASSISTANT-INFO: Enum dispatch over the manifest and REST gateways

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clipscreen_core::error::CoreResult;
use clipscreen_core::gateway::{ClipRecord, ManifestGateway, MetadataGateway, RestGateway};

use crate::cli::SourceArgs;

/// Metadata gateway selected on the command line.
#[derive(Debug)]
pub enum ClipSource {
    Manifest(ManifestGateway),
    Rest(RestGateway),
}

impl ClipSource {
    /// Picks the gateway from the arguments. A manifest takes precedence over
    /// a REST store.
    pub fn from_args(args: &SourceArgs) -> Result<Self> {
        if let Some(path) = &args.manifest {
            if args.gateway_url.is_some() {
                log::warn!("Both --manifest and --gateway-url given, using the manifest");
            }
            return Ok(ClipSource::Manifest(ManifestGateway::new(path.clone())));
        }

        let Some(url) = args.gateway_url.as_deref() else {
            bail!("No clip source configured: pass --manifest <FILE> or --gateway-url <URL>");
        };
        let Some(key) = args.gateway_key.as_deref() else {
            bail!("--gateway-url requires a gateway key (--gateway-key or CLIPSCREEN_GATEWAY_KEY)");
        };

        let gateway = RestGateway::new(
            url,
            key,
            &args.gateway_table,
            Duration::from_secs(args.service_timeout),
        )
        .context("Failed to set up the metadata gateway")?;
        Ok(ClipSource::Rest(gateway))
    }

    /// Short description for log output.
    pub fn describe(&self) -> String {
        match self {
            ClipSource::Manifest(gateway) => format!("manifest {}", gateway.path().display()),
            ClipSource::Rest(gateway) => format!("REST table {}", gateway.table_url()),
        }
    }
}

impl MetadataGateway for ClipSource {
    fn list_clips(&self) -> CoreResult<Vec<ClipRecord>> {
        match self {
            ClipSource::Manifest(gateway) => gateway.list_clips(),
            ClipSource::Rest(gateway) => gateway.list_clips(),
        }
    }

    fn get_clip(&self, id: &str) -> CoreResult<Option<ClipRecord>> {
        match self {
            ClipSource::Manifest(gateway) => gateway.get_clip(id),
            ClipSource::Rest(gateway) => gateway.get_clip(id),
        }
    }

    fn check_connection(&self) -> bool {
        match self {
            ClipSource::Manifest(gateway) => gateway.check_connection(),
            ClipSource::Rest(gateway) => gateway.check_connection(),
        }
    }
}
