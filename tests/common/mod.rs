//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use issuesync::config::TargetConfig;
use issuesync::manifest::{Manifest, ManifestBuilder};
use issuesync_av::Transformer;
use zip::write::SimpleFileOptions;

/// Write a zip archive whose members hold their own names as content.
pub fn write_edition_zip(path: &Path, members: &[&str]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for name in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(name.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn target(root: impl Into<PathBuf>, skip: &[&str]) -> TargetConfig {
    TargetConfig {
        root: root.into(),
        skip_sections: skip.iter().map(|s| s.to_string()).collect(),
    }
}

/// Build a manifest of `n` single-section jobs inside `root`. Sources are
/// written to `sources` and named after their track number.
pub fn numbered_manifest(root: &Path, sources: &Path, n: usize) -> Arc<Manifest> {
    let names: Vec<String> = (1..=n)
        .map(|i| format!("{i} Leaders - Article {i}.mp3"))
        .collect();
    for name in &names {
        std::fs::write(sources.join(name), name).unwrap();
    }
    let manifest = ManifestBuilder::new(&target(root, &[]))
        .with_source_root(sources)
        .build(&names)
        .unwrap();
    Arc::new(manifest)
}

/// Copies each source after a per-track delay and records what it saw.
#[derive(Default)]
pub struct RecordingTransformer {
    /// Delay for track `i` at index `i - 1`; 10ms when absent.
    pub delays: Vec<Duration>,
    /// Track numbers whose transform fails.
    pub fail: HashSet<usize>,
    /// Create the destination before sleeping, like a tool that streams its
    /// output.
    pub partial_writes: bool,
    pub running: AtomicUsize,
    pub max_running: AtomicUsize,
    pub invoked: Mutex<Vec<usize>>,
}

impl RecordingTransformer {
    pub fn invoked(&self) -> Vec<usize> {
        self.invoked.lock().unwrap().clone()
    }
}

fn track_of(source: &Path) -> usize {
    let name = source.file_name().unwrap().to_str().unwrap();
    name.split(' ').next().unwrap().parse().unwrap()
}

#[async_trait]
impl Transformer for RecordingTransformer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn transform(&self, source: &Path, destination: &Path) -> issuesync_av::Result<()> {
        let track = track_of(source);
        self.invoked.lock().unwrap().push(track);

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);

        if self.partial_writes {
            std::fs::write(destination, b"partial")?;
        }

        let delay = self
            .delays
            .get(track - 1)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;

        let result = if self.fail.contains(&track) {
            Err(issuesync_av::Error::tool_failed("recording", "boom"))
        } else {
            std::fs::copy(source, destination)
                .map(|_| ())
                .map_err(issuesync_av::Error::from)
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
