//! Helpers for tests that need a configuration file on disk

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `contents` to `trellis.toml` inside a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the file is needed.
pub fn write_temp_config(contents: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("trellis.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}
