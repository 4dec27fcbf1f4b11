//! One complete sync run: archive in, device filled and flushed.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::archive::{self, Staging};
use crate::config::Config;
use crate::device;
use crate::manifest::{Manifest, ManifestBuilder};
use crate::scheduler::Scheduler;

/// Per-invocation options that do not belong in the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Archive to use instead of the newest one in the download directory
    pub archive: Option<PathBuf>,
    /// Print the manifest instead of touching the device
    pub dry_run: bool,
    /// Print the dry-run manifest as JSON
    pub json: bool,
}

/// Run the whole pipeline.
///
/// The target root is wiped only after the archive has been unpacked, the
/// manifest has been validated and the transformer's tools have been
/// located, so a bad archive or a missing `sox` leaves the device untouched.
pub async fn run(config: &Config, options: &RunOptions) -> Result<()> {
    let start = Instant::now();

    let archive_path = match &options.archive {
        Some(path) => path.clone(),
        None => archive::discover(&config.source)?,
    };
    if !archive_path.is_file() {
        anyhow::bail!("Archive does not exist: {:?}", archive_path);
    }
    info!(
        "Archive: {}",
        archive_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );

    let staging = extract(archive_path).await?;
    let builder = ManifestBuilder::new(&config.target).with_source_root(staging.path());

    if options.dry_run {
        let manifest = builder.plan(staging.entries())?;
        print_plan(&manifest, options.json)?;
        return staging.close();
    }

    let transformer = issuesync_av::build_transformer(&config.transform, &config.tools)
        .context("Failed to set up transform")?;
    info!("Transform: {}", transformer.name());

    // Validate every destination before last week's files are wiped.
    let manifest = builder.plan(staging.entries())?;
    device::reset_target(&config.target.root)?;
    manifest.create_section_dirs()?;
    let manifest = Arc::new(manifest);

    let scheduler = Scheduler::new(config.scheduler.resolve(), transformer);
    let report = scheduler.run(Arc::clone(&manifest)).await?;

    device::sync_storage(&config.target.root, config.scheduler.sync_passes).await?;
    staging.close()?;

    let written = device::summarize(&config.target.root);
    info!(
        "Wrote {} files ({} bytes) in {} sections",
        report.completed,
        written.bytes,
        manifest.sections().len()
    );
    info!("Finished in {}s", start.elapsed().as_secs());
    Ok(())
}

async fn extract(archive_path: PathBuf) -> Result<Staging> {
    tokio::task::spawn_blocking(move || archive::extract(&archive_path))
        .await
        .context("Extraction task failed")?
}

fn print_plan(manifest: &Manifest, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(manifest)?);
        return Ok(());
    }

    println!("[DRY RUN] {} jobs into {}", manifest.len(), manifest.root().display());
    for section in manifest.skipped_sections() {
        println!("  skip {}", section);
    }
    let mut jobs = manifest.jobs().iter().peekable();
    for section in manifest.sections() {
        println!("{}/", section.name);
        while let Some(job) = jobs.next_if(|j| j.destination.starts_with(&section.path)) {
            println!(
                "  {} <- {}",
                job.destination
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default(),
                job.source.display()
            );
        }
    }
    Ok(())
}
