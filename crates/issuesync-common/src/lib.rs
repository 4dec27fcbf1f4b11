//! Issuesync-Common: shared error type, filename classification and
//! destination naming.
//!
//! This crate provides the string-processing glue used by the manifest
//! builder and the scheduler:
//!
//! - **Classification**: recognize archive members that are article tracks
//! - **Normalization**: turn section and article titles into safe file names
//! - **Destination paths**: format `<NN>-<section>/<track>-<article>.mp3` and
//!   parse such a path back into its section and article
//! - **Error Handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use issuesync_common::naming::{classify, normalize_article, normalize_section};
//!
//! let item = classify("1 Leaders - Editor's Note.mp3").unwrap();
//! assert_eq!(item.track, "1");
//! assert_eq!(normalize_section(&item.section), "Leaders");
//! assert_eq!(normalize_article(&item.article), "Editors_Note.mp3");
//! ```

pub mod error;
pub mod naming;
pub mod paths;

pub use error::{Error, Result};
pub use naming::RawItem;
pub use paths::DestinationName;
