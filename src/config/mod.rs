mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./issuesync.toml",
        "~/.config/issuesync/config.toml",
        "/etc/issuesync/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    expand_paths(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Expand `~` and `$VAR` in every configured path
fn expand_paths(config: &mut Config) -> Result<()> {
    config.source.download_dir = expand(&config.source.download_dir, "source.download_dir")?;
    config.target.root = expand(&config.target.root, "target.root")?;
    if let Some(ref p) = config.tools.sox_path {
        config.tools.sox_path = Some(expand(p, "tools.sox_path")?);
    }
    if let Some(ref p) = config.tools.ffmpeg_path {
        config.tools.ffmpeg_path = Some(expand(p, "tools.ffmpeg_path")?);
    }
    Ok(())
}

fn expand(path: &Path, field: &str) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand {} ({})", field, raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.target.root.as_os_str().is_empty() {
        anyhow::bail!("target.root cannot be empty");
    }

    if config.target.root.parent().is_none() {
        anyhow::bail!(
            "target.root {:?} has no parent; refusing to wipe a filesystem root",
            config.target.root
        );
    }

    regex::Regex::new(&config.source.archive_pattern).with_context(|| {
        format!(
            "source.archive_pattern is not a valid regex: {}",
            config.source.archive_pattern
        )
    })?;

    if config.transform.tempo <= 0.0 {
        anyhow::bail!("transform.tempo must be positive");
    }

    if matches!(config.transform.volume, Some(v) if v <= 0.0) {
        anyhow::bail!("transform.volume must be positive");
    }

    if config.scheduler.sync_passes == 0 {
        anyhow::bail!("scheduler.sync_passes must be at least 1");
    }

    for section in &config.target.skip_sections {
        let normalized = issuesync_common::naming::normalize_section(section);
        if normalized != *section {
            tracing::warn!(
                "Skip section {:?} is not normalized and will never match (did you mean {:?}?)",
                section,
                normalized
            );
        }
    }

    Ok(())
}
