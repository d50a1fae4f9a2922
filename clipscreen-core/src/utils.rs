//! Utility functions for formatting and file naming.
//!
//! General-purpose helpers used throughout clipscreen-core: byte and duration
//! formatting for logs and summaries, and the naming rules for temp files
//! and frame artifacts.

use std::time::Duration;

use sha2::{Digest, Sha256};
use url::Url;

use crate::config::{DEFAULT_TEMP_EXTENSION, SUPPORTED_VIDEO_EXTENSIONS};

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a processing time with two decimals of seconds (e.g., "1.25s").
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Turns a clip id into something safe to use as a file stem.
///
/// Alphanumerics, `-` and `_` pass through; everything else becomes `_`.
/// An id with nothing usable left becomes `"clip"`. Whenever the id had to
/// change, a short digest of the raw id is appended so distinct ids never
/// share a stem.
#[must_use]
pub fn sanitize_file_stem(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if cleaned == id && !id.is_empty() && !id.chars().all(|c| c == '_') {
        return cleaned;
    }

    let base = cleaned.trim_matches('_');
    let base = if base.is_empty() { "clip" } else { base };
    format!("{base}_{}", short_digest(id))
}

/// First eight hex digits of the SHA-256 of `value`.
fn short_digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize()[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// Picks the temp file extension for a download from its URL path.
///
/// Recognised video extensions are kept (lowercased); anything else falls
/// back to the default container extension.
#[must_use]
pub fn video_extension_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|last| {
            last.rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
        })
        .filter(|ext| SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| DEFAULT_TEMP_EXTENSION.to_string())
}

/// File name of the frame artifact for `clip_id` at 1-based `index`.
#[must_use]
pub fn frame_file_name(clip_id: &str, index: usize) -> String {
    format!("{}_frame_{index}.jpg", sanitize_file_stem(clip_id))
}
