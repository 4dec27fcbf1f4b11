//! Destination path layout.
//!
//! Every job writes `<root>/<NN>-<section>/<track>-<article>.mp3`, where `NN`
//! is the zero-padded position of the section run on the device. The same
//! shape is parsed back out of a destination so that log lines never depend
//! on anything but the path itself.

use std::path::Path;

use crate::{Error, Result};

/// Extension carried by every destination file.
const AUDIO_EXTENSION: &str = "mp3";

/// Section and article recovered from a destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationName {
    /// Normalized section name, without the numeric prefix.
    pub section: String,
    /// Normalized article name, without the track prefix and extension.
    pub article: String,
}

impl DestinationName {
    /// Parse a destination path of the shape `.../<NN>-<section>/<track>-<article>.mp3`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDestination`] when the path does not have that shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use issuesync_common::DestinationName;
    /// use std::path::Path;
    ///
    /// let name = DestinationName::parse(Path::new("/media/ec/01-Leaders/1-Editors_Note.mp3")).unwrap();
    /// assert_eq!(name.section, "Leaders");
    /// assert_eq!(name.article, "Editors_Note");
    /// ```
    pub fn parse(path: &Path) -> Result<Self> {
        let invalid = || Error::invalid_destination(path);

        if path.extension().and_then(|e| e.to_str()) != Some(AUDIO_EXTENSION) {
            return Err(invalid());
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
        let folder = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?;

        let article = strip_number_prefix(stem).ok_or_else(invalid)?;
        let section = strip_number_prefix(folder).ok_or_else(invalid)?;

        Ok(Self {
            section: section.to_string(),
            article: article.to_string(),
        })
    }
}

/// Directory name for the `index`-th section run.
pub fn section_dir_name(index: usize, section: &str) -> String {
    format!("{index:02}-{section}")
}

/// File name for a track inside its section directory.
///
/// `article` is the normalized article name and already carries its extension.
pub fn track_file_name(track: &str, article: &str) -> String {
    format!("{track}-{article}")
}

/// Strip a `<digits>-` prefix, requiring a non-empty remainder.
fn strip_number_prefix(name: &str) -> Option<&str> {
    let (digits, rest) = name.split_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || rest.is_empty() {
        return None;
    }
    Some(rest)
}
