//! Command implementations.
//!
//! - [`analyze`] - analyze an archive in S3 (or an S3-compatible endpoint)
//! - [`analyze_local`] - analyze a directory mirror of an archive
//! - [`report`] - console rendering and file export shared by both
//!
//! Each command exposes `run`, which prints the report and writes the
//! optional output file, and `analyze`, which only returns it.

pub mod analyze;
pub mod analyze_local;
pub mod report;
