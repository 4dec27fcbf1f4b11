//! Locating the weekly archive and unpacking it into a staging directory.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::config::SourceConfig;

/// Find the newest archive in the download directory.
///
/// Newest means last by file name among the names matching
/// `archive_pattern`; editions are named so that this is also the latest
/// issue.
pub fn discover(source: &SourceConfig) -> Result<PathBuf> {
    let pattern = Regex::new(&source.archive_pattern)
        .with_context(|| format!("Invalid archive pattern: {}", source.archive_pattern))?;

    let entries = std::fs::read_dir(&source.download_dir)
        .with_context(|| format!("Failed to read {:?}", source.download_dir))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if pattern.is_match(name) {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    debug!("Archive candidates: {:?}", candidates);
    candidates.pop().with_context(|| {
        format!(
            "No archive matching {:?} in {:?}",
            source.archive_pattern, source.download_dir
        )
    })
}

/// An unpacked archive. The directory is removed when this is dropped.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
    entries: Vec<String>,
}

impl Staging {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Member names relative to [`path`](Self::path), in archive order.
    /// Directories are not listed.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Remove the staging directory, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("Failed to remove staging directory {:?}", path))
    }
}

/// Extract every file of a zip archive into a fresh staging directory.
///
/// Members whose names would escape the staging directory are skipped.
pub fn extract(archive: &Path) -> Result<Staging> {
    let file = File::open(archive).with_context(|| format!("Failed to open {:?}", archive))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive {:?}", archive))?;

    let dir = tempfile::Builder::new()
        .prefix("issuesync-staging-")
        .tempdir()
        .context("Failed to create staging directory")?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut member = zip
            .by_index(i)
            .with_context(|| format!("Failed to read member {} of {:?}", i, archive))?;
        if member.is_dir() {
            continue;
        }
        let Some(relative) = member.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive member {:?}", member.name());
            continue;
        };

        let out_path = dir.path().join(&relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("Failed to create {:?}", out_path))?;
        std::io::copy(&mut member, &mut out)
            .with_context(|| format!("Failed to extract {:?}", member.name()))?;

        entries.push(relative.to_string_lossy().replace('\\', "/"));
    }

    debug!("Extracted {} files to {:?}", entries.len(), dir.path());
    Ok(Staging { dir, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, data) in members {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_lists_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("edition.zip");
        write_zip(
            &archive,
            &[
                ("Issue 9400/", b""),
                ("Issue 9400/1 Leaders - A.mp3", b"one"),
                ("Issue 9400/2 Leaders - B.mp3", b"two"),
                ("cover.jpg", b"jpeg"),
            ],
        );

        let staging = extract(&archive).unwrap();
        assert_eq!(
            staging.entries(),
            ["Issue 9400/1 Leaders - A.mp3", "Issue 9400/2 Leaders - B.mp3", "cover.jpg"]
        );
        assert_eq!(
            std::fs::read(staging.path().join("Issue 9400/2 Leaders - B.mp3")).unwrap(),
            b"two"
        );

        let path = staging.path().to_path_buf();
        staging.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("edition.zip");
        std::fs::write(&archive, "not a zip").unwrap();
        assert!(extract(&archive).is_err());
    }

    #[test]
    fn test_discover_takes_last_match() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "TheEconomist.2024.01.06.zip",
            "TheEconomist.2024.01.13.zip",
            "holiday.zip",
            "TheEconomist.2024.01.20.pdf",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("TheEconomist.2099.zip")).unwrap();

        let source = SourceConfig {
            download_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(
            discover(&source).unwrap(),
            dir.path().join("TheEconomist.2024.01.13.zip")
        );
    }

    #[test]
    fn test_discover_without_match_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceConfig {
            download_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = discover(&source).unwrap_err();
        assert!(err.to_string().contains("No archive matching"));
    }
}
