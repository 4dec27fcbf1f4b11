use std::collections::HashSet;
use std::path::{Path, PathBuf};

use issuesync_common::naming::{normalize_article, normalize_section};
use issuesync_common::paths::{section_dir_name, track_file_name};
use issuesync_common::{DestinationName, Error, Result};
use tracing::{debug, info};

use super::{Classifier, EditionClassifier, Job, Manifest, SectionDir};
use crate::config::TargetConfig;

/// Builds a [`Manifest`] from archive member names.
///
/// Names are relative to the staging directory (`source_root`) and are
/// classified by their last path component only.
pub struct ManifestBuilder {
    root: PathBuf,
    skip: HashSet<String>,
    source_root: PathBuf,
    classifier: Box<dyn Classifier>,
}

impl ManifestBuilder {
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            root: target.root.clone(),
            skip: target.skip_sections.iter().cloned().collect(),
            source_root: PathBuf::new(),
            classifier: Box::new(EditionClassifier),
        }
    }

    /// Directory the member names are relative to.
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Compute the manifest without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Fails when a destination does not parse back into a section and an
    /// article (an empty normalized name, for instance), or when two members
    /// map to the same destination.
    pub fn plan<S: AsRef<str>>(&self, names: &[S]) -> Result<Manifest> {
        let mut jobs = Vec::new();
        let mut sections: Vec<SectionDir> = Vec::new();
        let mut skipped = Vec::new();
        let mut destinations = HashSet::new();

        // `last_seen` follows every recognized member and only gates the skip
        // log; `last_retained` decides when a new section directory starts.
        let mut last_seen: Option<String> = None;
        let mut last_retained: Option<String> = None;

        for name in names {
            let name = name.as_ref();
            let Some(item) = self.classifier.classify(file_name(name)) else {
                debug!("Ignoring {}", name);
                continue;
            };

            let section = normalize_section(&item.section);
            let article = normalize_article(&item.article);

            let new_section = last_seen.as_deref() != Some(section.as_str());
            last_seen = Some(section.clone());

            if self.skip.contains(&section) {
                if new_section {
                    info!("Skipping section {}", section);
                    skipped.push(section);
                }
                continue;
            }

            if last_retained.as_deref() != Some(section.as_str()) {
                let index = sections.len();
                let dir_name = section_dir_name(index, &section);
                sections.push(SectionDir {
                    index,
                    path: self.root.join(&dir_name),
                    name: dir_name,
                });
                last_retained = Some(section);
            }

            let dir = match sections.last() {
                Some(dir) => &dir.path,
                None => return Err(Error::invalid_input("no section directory allocated")),
            };
            let destination = dir.join(track_file_name(&item.track, &article));
            let parsed = DestinationName::parse(&destination)?;

            if !destinations.insert(destination.clone()) {
                return Err(Error::duplicate_destination(destination));
            }

            jobs.push(Job {
                sequence_index: jobs.len(),
                track: item.track,
                section: parsed.section,
                article: parsed.article,
                source: self.source_root.join(name),
                destination,
            });
        }

        Ok(Manifest {
            root: self.root.clone(),
            jobs,
            sections,
            skipped,
        })
    }

    /// Plan the manifest and create its section directories.
    pub fn build<S: AsRef<str>>(&self, names: &[S]) -> Result<Manifest> {
        let manifest = self.plan(names)?;
        manifest.create_section_dirs()?;
        Ok(manifest)
    }
}

impl Manifest {
    /// Create every section directory under the target root.
    ///
    /// The target root must already exist. Directories are created with
    /// `create_dir`, never `create_dir_all`, so a missing mount point fails
    /// here instead of silently filling the parent filesystem.
    pub fn create_section_dirs(&self) -> Result<()> {
        for section in self.sections() {
            create_section_dir(&section.path)?;
        }
        debug!(
            "Created {} section directories under {:?}",
            self.sections().len(),
            self.root()
        );
        Ok(())
    }
}

fn create_section_dir(path: &Path) -> Result<()> {
    std::fs::create_dir(path).map_err(|source| Error::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Last component of an archive member name. Zip names always use `/`.
fn file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
