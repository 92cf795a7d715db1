//! CloudTrail log parsing and principal identity handling.
//!
//! - [`types`] - Record and file structures for CloudTrail JSON
//! - [`parser`] - Payload decompression and per-record decoding
//! - [`identity`] - Principal ARN canonicalization

pub mod identity;
pub mod parser;
pub mod types;
