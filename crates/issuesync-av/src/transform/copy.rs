//! Byte-for-byte copy.

use std::path::Path;

use async_trait::async_trait;

use super::Transformer;
use crate::{Result, Workspace};

/// Copies the source unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTransformer;

#[async_trait]
impl Transformer for CopyTransformer {
    fn name(&self) -> &'static str {
        "copy"
    }

    async fn transform(&self, source: &Path, destination: &Path) -> Result<()> {
        Workspace::deliver(source, destination).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("1 Leaders - Note.mp3");
        let dest = dir.path().join("1-Note.mp3");
        std::fs::write(&src, b"ID3 raw").unwrap();

        CopyTransformer.transform(&src, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"ID3 raw");
    }

    #[tokio::test]
    async fn missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = CopyTransformer
            .transform(&dir.path().join("gone.mp3"), &dir.path().join("out.mp3"))
            .await;
        assert!(result.is_err());
    }
}
