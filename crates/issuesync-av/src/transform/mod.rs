//! Per-file transformations: raw copy, sox tempo change, ffmpeg re-encode.
//!
//! Every [`Transformer`] honors the same contract: when `transform` returns
//! `Ok`, the destination file is completely written and flushed to disk;
//! when it returns `Err`, the caller treats the whole run as failed. Scratch
//! files are confined to a [`Workspace`](crate::Workspace) and disappear with
//! it.

mod copy;
mod encode;
mod tempo;

pub use copy::CopyTransformer;
pub use encode::EncodeTransformer;
pub use tempo::TempoTransformer;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tools::ToolPaths;
use crate::{Error, Result};

/// One file transformation.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// A short, human-readable name (e.g. "sox tempo").
    fn name(&self) -> &'static str;

    /// Produce `destination` from `source`.
    async fn transform(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// How each article is written to the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// Copy the archive member byte for byte.
    Copy,
    /// Speed up with `sox tempo`, optionally scaling the volume.
    #[default]
    Tempo,
    /// Re-encode with ffmpeg, applying tempo and volume filters.
    Encode,
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformMode::Copy => write!(f, "copy"),
            TransformMode::Tempo => write!(f, "tempo"),
            TransformMode::Encode => write!(f, "encode"),
        }
    }
}

/// Parameters shared by all transform modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSettings {
    #[serde(default)]
    pub mode: TransformMode,

    /// Tempo (speed-up) factor.
    #[serde(default = "default_tempo")]
    pub tempo: f64,

    /// Volume scaling factor; `None` leaves the level alone.
    #[serde(default)]
    pub volume: Option<f64>,

    /// MP3 bitrate for `encode`.
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    /// Maximum time a single tool invocation may take.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_tempo() -> f64 {
    1.7
}

fn default_bitrate() -> String {
    "64k".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            mode: TransformMode::default(),
            tempo: default_tempo(),
            volume: None,
            bitrate: default_bitrate(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TransformSettings {
    /// Tool timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the transformer selected by `settings`, resolving the tool it needs.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] when the mode's tool is missing and
/// [`Error::InvalidInput`] for a non-positive tempo or volume.
pub fn build_transformer(
    settings: &TransformSettings,
    tools: &ToolPaths,
) -> Result<Arc<dyn Transformer>> {
    if settings.tempo <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "tempo must be positive, got {}",
            settings.tempo
        )));
    }
    if let Some(v) = settings.volume {
        if v <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "volume must be positive, got {v}"
            )));
        }
    }

    let transformer: Arc<dyn Transformer> = match settings.mode {
        TransformMode::Copy => Arc::new(CopyTransformer),
        TransformMode::Tempo => Arc::new(TempoTransformer::new(tools.sox()?, settings)),
        TransformMode::Encode => Arc::new(EncodeTransformer::new(tools.ffmpeg()?, settings)),
    };

    tracing::debug!("Using {} transformer", transformer.name());
    Ok(transformer)
}
