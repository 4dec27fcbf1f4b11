//! The removable target device: wiping it and flushing it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Files and bytes below a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Count the regular files below `root`. Unreadable entries are ignored.
pub fn summarize(root: &Path) -> TargetSummary {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .fold(TargetSummary::default(), |acc, e| TargetSummary {
            files: acc.files + 1,
            bytes: acc.bytes + e.metadata().map(|m| m.len()).unwrap_or(0),
        })
}

/// Delete `root` and recreate it empty.
///
/// The parent (the device's mount point) is never created, so an unmounted
/// device fails here rather than filling the host disk.
pub fn reset_target(root: &Path) -> Result<()> {
    if root.exists() {
        let existing = summarize(root);
        info!(
            "Clearing {} files from {}",
            existing.files,
            root.display()
        );
        std::fs::remove_dir_all(root)
            .with_context(|| format!("Failed to remove {:?}", root))?;
    }

    std::fs::create_dir(root)
        .with_context(|| format!("Failed to create {:?} (is the device mounted?)", root))?;
    Ok(())
}

/// Flush pending writes to storage `passes` times in a row.
pub async fn sync_storage(root: &Path, passes: u32) -> Result<()> {
    for pass in 1..=passes {
        debug!("Sync pass {}/{}", pass, passes);
        let root: PathBuf = root.to_path_buf();
        tokio::task::spawn_blocking(move || flush(&root))
            .await
            .context("Sync task failed")?
            .context("Failed to flush target")?;
    }
    Ok(())
}

#[cfg(unix)]
fn flush(_root: &Path) -> std::io::Result<()> {
    nix::unistd::sync();
    Ok(())
}

#[cfg(not(unix))]
fn flush(root: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            std::fs::File::open(entry.path())?.sync_all()?;
        }
    }
    Ok(())
}
