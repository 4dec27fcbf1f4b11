//! Tempo change with sox.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::{TransformSettings, Transformer};
use crate::command::ToolCommand;
use crate::{Result, Workspace};

/// Runs `sox <in> <out> tempo -s <factor> [vol <gain>]`.
#[derive(Debug, Clone)]
pub struct TempoTransformer {
    sox: PathBuf,
    tempo: f64,
    volume: Option<f64>,
    timeout: Duration,
}

impl TempoTransformer {
    pub fn new(sox: PathBuf, settings: &TransformSettings) -> Self {
        Self {
            sox,
            tempo: settings.tempo,
            volume: settings.volume,
            timeout: settings.timeout(),
        }
    }

    fn effects(&self) -> Vec<String> {
        let mut effects = vec!["tempo".to_string(), "-s".to_string(), self.tempo.to_string()];
        if let Some(v) = self.volume {
            effects.push("vol".to_string());
            effects.push(v.to_string());
        }
        effects
    }
}

#[async_trait]
impl Transformer for TempoTransformer {
    fn name(&self) -> &'static str {
        "sox tempo"
    }

    async fn transform(&self, source: &Path, destination: &Path) -> Result<()> {
        let workspace = Workspace::new("sox")?;
        let output = workspace.temp_file("tempo.mp3");

        ToolCommand::new(self.sox.clone())
            .path_arg(source)
            .path_arg(&output)
            .args(self.effects())
            .timeout(self.timeout)
            .execute()
            .await?;

        Workspace::deliver(&output, destination).await?;
        Ok(())
    }
}
