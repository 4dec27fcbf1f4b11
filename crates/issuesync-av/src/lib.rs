//! # issuesync-av
//!
//! External audio tools and per-file transformation for issuesync.
//!
//! This crate provides functionality for:
//! - Locating `sox` and `ffmpeg` (configured path or `PATH`)
//! - Running tools asynchronously with a timeout ([`ToolCommand`])
//! - Scratch workspaces that vanish on drop ([`Workspace`])
//! - Transforming one archive member into one file on the device
//!   ([`Transformer`]): raw copy, sox tempo change, or ffmpeg re-encode
//!
//! ## Example
//!
//! ```no_run
//! use issuesync_av::{build_transformer, ToolPaths, TransformSettings};
//! use std::path::Path;
//!
//! # async fn example() -> issuesync_av::Result<()> {
//! let transformer = build_transformer(&TransformSettings::default(), &ToolPaths::default())?;
//! transformer
//!     .transform(
//!         Path::new("/tmp/staging/1 Leaders - Note.mp3"),
//!         Path::new("/media/ec/00-Leaders/1-Note.mp3"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
mod error;
pub mod tools;
pub mod transform;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo, ToolPaths};
pub use transform::{build_transformer, TransformMode, TransformSettings, Transformer};
pub use workspace::Workspace;
