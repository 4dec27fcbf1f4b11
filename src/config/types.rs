use issuesync_av::{ToolPaths, TransformSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::SchedulerSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub transform: TransformSettings,

    #[serde(default)]
    pub tools: ToolPaths,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Where the weekly archive is picked up.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Directory searched when no archive is given on the command line
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Regex matched against file names in `download_dir`; the last match by
    /// name wins
    #[serde(default = "default_archive_pattern")]
    pub archive_pattern: String,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("~/Downloads")
}

fn default_archive_pattern() -> String {
    r".*The.*Economist.*\.zip$".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            archive_pattern: default_archive_pattern(),
        }
    }
}

/// The removable device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Destination root; wiped and recreated on every run. Its parent must
    /// already exist (the mount point).
    #[serde(default = "default_target_root")]
    pub root: PathBuf,

    /// Normalized section names that are never written to the device
    #[serde(default = "default_skip_sections")]
    pub skip_sections: Vec<String>,
}

#[cfg(target_os = "macos")]
fn default_target_root() -> PathBuf {
    PathBuf::from("/Volumes/ECONOMIST/ec")
}

#[cfg(not(target_os = "macos"))]
fn default_target_root() -> PathBuf {
    PathBuf::from("/media/$USER/ECONOMIST/ec")
}

#[cfg(target_os = "macos")]
fn default_skip_sections() -> Vec<String> {
    ["The_Americas", "Asia", "China", "Middle_East_and_Africa", "Europe"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(not(target_os = "macos"))]
fn default_skip_sections() -> Vec<String> {
    [
        "Letters",
        "The_Americas",
        "Asia",
        "China",
        "Middle_East_and_Africa",
        "Europe",
        "Finance_and_economics",
        "Books_and_arts",
        "Graphic_detail",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            root: default_target_root(),
            skip_sections: default_skip_sections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Worker slots; 0 means one per CPU
    #[serde(default)]
    pub concurrency: usize,

    /// Pause after each launch so files land on the device roughly in
    /// playback order
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Number of storage flushes after the last job completes
    #[serde(default = "default_sync_passes")]
    pub sync_passes: u32,
}

fn default_launch_delay_ms() -> u64 {
    100
}

fn default_sync_passes() -> u32 {
    2
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            launch_delay_ms: default_launch_delay_ms(),
            sync_passes: default_sync_passes(),
        }
    }
}

impl SchedulerConfig {
    /// Resolve `concurrency = 0` to the CPU count.
    pub fn resolve(&self) -> SchedulerSettings {
        let concurrency = if self.concurrency == 0 {
            num_cpus::get()
        } else {
            self.concurrency
        };
        SchedulerSettings {
            concurrency,
            launch_delay: Duration::from_millis(self.launch_delay_ms),
        }
    }
}
