//! Utility functions and helpers.
//!
//! - [`parallel`] - Fixed-width async worker pool shared by the pipeline phases
//! - [`progress`] - Progress bars for console runs
//! - [`reader`] - Payload decompression with format detection
//! - [`format`] - Number formatting helpers

pub mod format;
pub mod parallel;
pub mod progress;
pub mod reader;
