//! Per-job scratch space.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

/// Scratch directory for one transformation.
///
/// Intermediate files live in a private temporary directory that is removed
/// when the workspace is dropped, whether the job succeeded or not. The
/// finished file is moved onto the device with [`Workspace::deliver`].
///
/// # Example
///
/// ```no_run
/// use issuesync_av::Workspace;
/// use std::path::Path;
///
/// # async fn example() -> issuesync_av::Result<()> {
/// let workspace = Workspace::new("job-3")?;
/// let out = workspace.temp_file("tempo.mp3");
/// // ... run a tool writing `out` ...
/// Workspace::deliver(&out, Path::new("/media/ec/00-Leaders/1-Note.mp3")).await?;
/// # Ok(())
/// # }
/// ```
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a new workspace; `label` ends up in the directory name.
    pub fn new(label: &str) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("issuesync-{label}-"))
            .tempdir()
            .map_err(|e| Error::Workspace(e.to_string()))?;

        Ok(Self { temp_dir })
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Copy `from` to `destination` and flush the destination to disk.
    ///
    /// The destination is created (or truncated), written completely and
    /// `fsync`ed before this returns. A rename is never used: scratch space
    /// and removable devices are different filesystems.
    pub async fn deliver(from: &Path, destination: &Path) -> Result<u64> {
        let mut src = tokio::fs::File::open(from).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(from)
            } else {
                Error::Io(e)
            }
        })?;
        let mut dst = tokio::fs::File::create(destination).await?;

        let bytes = tokio::io::copy(&mut src, &mut dst).await?;
        dst.flush().await?;
        dst.sync_all().await?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn temp_file_inside_workspace() {
        let ws = Workspace::new("test").unwrap();
        let tf = ws.temp_file("tempo.mp3");
        assert!(tf.starts_with(ws.temp_dir()));
        assert_eq!(tf.file_name().unwrap(), "tempo.mp3");
        assert!(ws
            .temp_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("issuesync-test-"));
    }

    #[test]
    fn drop_removes_scratch() {
        let ws = Workspace::new("drop").unwrap();
        let dir = ws.temp_dir().to_path_buf();
        fs::write(ws.temp_file("partial.mp3"), b"half").unwrap();
        assert!(dir.exists());

        drop(ws);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn deliver_copies_bytes() {
        let ws = Workspace::new("deliver").unwrap();
        let out = ws.temp_file("out.mp3");
        fs::write(&out, b"processed audio").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("1-Note.mp3");
        let bytes = Workspace::deliver(&out, &dest).await.unwrap();

        assert_eq!(bytes, 15);
        assert_eq!(fs::read(&dest).unwrap(), b"processed audio");
    }

    #[tokio::test]
    async fn deliver_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = Workspace::deliver(&dir.path().join("nope.mp3"), &dir.path().join("x.mp3")).await;
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
