//! Decoding of CloudTrail log file payloads.

use super::types::{TrailFile, TrailRecord};
use crate::utils::reader::open_payload;
use thiserror::Error;

/// Why a payload could not be turned into records
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decompress payload: {0}")]
    Decompress(#[source] std::io::Error),
    #[error("failed to parse log file JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Decompress and parse one log file.
///
/// Only the envelope is validated here; records stay raw until
/// [`decode_records`] visits them.
pub fn decode_trail_file(bytes: &[u8]) -> Result<TrailFile, DecodeError> {
    let reader = open_payload(bytes).map_err(DecodeError::Decompress)?;
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            DecodeError::Decompress(e.into())
        } else {
            DecodeError::Parse(e)
        }
    })
}

/// Result of decoding the records of one file
#[derive(Debug, Default)]
pub struct DecodedRecords {
    pub records: Vec<TrailRecord>,
    /// Records that did not match the record schema
    pub malformed: usize,
}

/// Decode each raw record independently, skipping malformed ones.
pub fn decode_records(file: TrailFile) -> DecodedRecords {
    let mut decoded = DecodedRecords {
        records: Vec::with_capacity(file.records.len()),
        malformed: 0,
    };

    for raw in file.records {
        match serde_json::from_value::<TrailRecord>(raw) {
            Ok(record) => decoded.records.push(record),
            Err(_) => decoded.malformed += 1,
        }
    }

    decoded
}
