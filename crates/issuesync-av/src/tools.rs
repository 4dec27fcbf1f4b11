//! External tool detection and management.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Optional per-tool executable overrides.
///
/// A configured path wins when it exists; otherwise the tool is looked up in
/// `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Path to `sox`.
    #[serde(default)]
    pub sox_path: Option<PathBuf>,

    /// Path to `ffmpeg`.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

impl ToolPaths {
    /// Resolve `sox`.
    pub fn sox(&self) -> Result<PathBuf> {
        get_tool_path("sox", self.sox_path.as_deref())
    }

    /// Resolve `ffmpeg`.
    pub fn ffmpeg(&self) -> Result<PathBuf> {
        get_tool_path("ffmpeg", self.ffmpeg_path.as_deref())
    }
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use issuesync_av::check_tool;
///
/// let info = check_tool("sox");
/// if info.available {
///     println!("sox version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "--version")
}

/// Check if a tool is available using a custom version argument.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            // sox prints its banner on stderr
            let banner = if output.stdout.is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            let version = String::from_utf8_lossy(banner)
                .lines()
                .find(|l| !l.trim().is_empty())
                .map(|s| s.trim().to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(name).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools the transform modes rely on.
///
/// Returns information about sox and ffmpeg.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![check_tool("sox"), check_tool_with_arg("ffmpeg", "-version")]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("Configured {} path {:?} does not exist, searching PATH", name, path);
    }

    require_tool(name)
}
