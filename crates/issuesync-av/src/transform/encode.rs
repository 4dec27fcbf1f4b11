//! Re-encode with ffmpeg.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::{TransformSettings, Transformer};
use crate::command::ToolCommand;
use crate::{Result, Workspace};

/// Re-encodes to MP3 with `atempo`/`volume` filters applied.
#[derive(Debug, Clone)]
pub struct EncodeTransformer {
    ffmpeg: PathBuf,
    tempo: f64,
    volume: Option<f64>,
    bitrate: String,
    timeout: Duration,
}

impl EncodeTransformer {
    pub fn new(ffmpeg: PathBuf, settings: &TransformSettings) -> Self {
        Self {
            ffmpeg,
            tempo: settings.tempo,
            volume: settings.volume,
            bitrate: settings.bitrate.clone(),
            timeout: settings.timeout(),
        }
    }

    /// The `-filter:a` chain, or `None` when neither tempo nor volume change.
    fn audio_filters(&self) -> Option<String> {
        let mut filters = Vec::new();
        if (self.tempo - 1.0).abs() > f64::EPSILON {
            filters.push(format!("atempo={}", self.tempo));
        }
        if let Some(v) = self.volume {
            filters.push(format!("volume={v}"));
        }
        (!filters.is_empty()).then(|| filters.join(","))
    }
}

#[async_trait]
impl Transformer for EncodeTransformer {
    fn name(&self) -> &'static str {
        "ffmpeg encode"
    }

    async fn transform(&self, source: &Path, destination: &Path) -> Result<()> {
        let workspace = Workspace::new("ffmpeg")?;
        let output = workspace.temp_file("encoded.mp3");

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        cmd.args(["-hide_banner", "-nostdin", "-y", "-i"]);
        cmd.path_arg(source);
        if let Some(filters) = self.audio_filters() {
            cmd.args(["-filter:a".to_string(), filters]);
        }
        cmd.args(["-codec:a", "libmp3lame", "-b:a", self.bitrate.as_str()]);
        cmd.path_arg(&output);
        cmd.timeout(self.timeout);
        cmd.execute().await?;

        Workspace::deliver(&output, destination).await?;
        Ok(())
    }
}
