//! Manifest construction.
//!
//! A [`Manifest`] is the ordered list of file jobs for one run, together with
//! the section directories they write into. It is built once from the
//! archive member names and handed to the scheduler behind an `Arc`.

mod builder;

pub use builder::ManifestBuilder;

use std::path::{Path, PathBuf};

use issuesync_common::naming;
use issuesync_common::RawItem;
use serde::Serialize;

/// One source file to transform into one destination file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Position in the manifest, starting at 0.
    pub sequence_index: usize,
    /// Track number as written in the archive.
    pub track: String,
    /// Section name recovered from the destination path.
    pub section: String,
    /// Article name recovered from the destination path, without extension.
    pub article: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A numbered section directory under the target root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionDir {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

/// Ordered, immutable set of jobs for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    root: PathBuf,
    jobs: Vec<Job>,
    sections: Vec<SectionDir>,
    skipped: Vec<String>,
}

impl Manifest {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Section directories in creation order.
    pub fn sections(&self) -> &[SectionDir] {
        &self.sections
    }

    /// Skipped sections, one entry per skip event.
    pub fn skipped_sections(&self) -> &[String] {
        &self.skipped
    }
}

/// Maps an archive member's file name to its raw parts.
pub trait Classifier: Send + Sync {
    /// `None` means "not an article", and the member is ignored.
    fn classify(&self, file_name: &str) -> Option<RawItem>;
}

/// Recognizes the `[Issue N - ]<track> <section> - <article>.mp3` naming of
/// weekly audio editions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditionClassifier;

impl Classifier for EditionClassifier {
    fn classify(&self, file_name: &str) -> Option<RawItem> {
        naming::classify(file_name)
    }
}
