//! Issuesync - weekly audio edition sync
//!
//! This library crate exposes the core functionality for integration testing.

pub mod archive;
pub mod config;
pub mod device;
pub mod manifest;
pub mod pipeline;
pub mod scheduler;
