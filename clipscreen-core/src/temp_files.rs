//! Temporary file management utilities.
//!
//! Each clip attempt downloads into its own file under the configured temp
//! directory. `TempFileGuard` owns that path for the duration of the attempt
//! and removes it when dropped, so cleanup runs on early returns, propagated
//! errors and panics alike.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::Builder as TempFileBuilder;

use crate::error::{CoreError, CoreResult};
use crate::utils::{sanitize_file_stem, video_extension_from_url};

/// Returns the temp download path for a clip. Does not create the file.
pub fn temp_download_path(temp_dir: &Path, clip_id: &str, url: &str) -> PathBuf {
    let extension = video_extension_from_url(url);
    temp_dir.join(format!("{}.{extension}", sanitize_file_stem(clip_id)))
}

/// Checks that `dir` exists and that files can be created in it. Never
/// creates the directory. The probe file is removed before returning.
pub fn probe_dir_writable(dir: &Path) -> CoreResult<()> {
    if !dir.is_dir() {
        return Err(CoreError::NotFound(format!(
            "directory {} does not exist",
            dir.display()
        )));
    }
    let probe = TempFileBuilder::new()
        .prefix(".clipscreen_probe_")
        .tempfile_in(dir)?;
    probe.close()?;
    Ok(())
}

/// Exclusive owner of a per-clip temporary file. Removes it on drop.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    /// Takes ownership of `path`. Any stale file left there by an earlier
    /// run is removed first.
    pub fn claim(path: PathBuf) -> CoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        remove_if_present(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        match remove_if_present(&self.path) {
            Ok(true) => log::debug!("Cleaned up temporary file: {}", self.path.display()),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to clean up {}: {}", self.path.display(), e),
        }
    }
}

/// Removes `path` if it exists. Returns whether a file was removed.
pub(crate) fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn guard_removes_file_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        {
            let guard = TempFileGuard::claim(path.clone()).unwrap();
            fs::write(guard.path(), b"partial").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn guard_tolerates_file_never_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.mov");
        drop(TempFileGuard::claim(path.clone()).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn claim_removes_stale_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.mov");
        fs::write(&path, b"old").unwrap();
        let guard = TempFileGuard::claim(path.clone()).unwrap();
        assert!(!guard.path().exists());
    }

    #[test]
    fn temp_path_uses_sanitized_id_and_url_extension() {
        let path = temp_download_path(Path::new("/tmp/cs"), "clip/7", "https://x.test/v/a.mp4");
        let stem = sanitize_file_stem("clip/7");
        assert!(stem.starts_with("clip_7_"));
        assert_eq!(path, PathBuf::from(format!("/tmp/cs/{stem}.mp4")));
    }

    #[test]
    fn probe_leaves_directory_empty() {
        let dir = tempdir().unwrap();
        probe_dir_writable(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn probe_does_not_create_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(matches!(probe_dir_writable(&nested), Err(CoreError::NotFound(_))));
        assert!(!dir.path().join("a").exists());
    }
}
