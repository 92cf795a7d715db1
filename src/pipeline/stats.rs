//! Counters collected while the pipeline runs.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct StatsCounters {
    pub shards: AtomicUsize,
    pub shards_failed: AtomicUsize,
    pub files_listed: AtomicUsize,
    pub files_processed: AtomicUsize,
    pub fetch_failures: AtomicUsize,
    pub decompress_failures: AtomicUsize,
    pub parse_failures: AtomicUsize,
    pub records_seen: AtomicUsize,
    pub malformed_records: AtomicUsize,
    pub records_matched: AtomicUsize,
}

impl StatsCounters {
    pub fn add(counter: &AtomicUsize, n: usize) -> usize {
        counter.fetch_add(n, Ordering::Relaxed) + n
    }

    pub fn snapshot(&self) -> RunStats {
        let get = |c: &AtomicUsize| c.load(Ordering::Relaxed);
        RunStats {
            shards: get(&self.shards),
            shards_failed: get(&self.shards_failed),
            files_listed: get(&self.files_listed),
            files_processed: get(&self.files_processed),
            fetch_failures: get(&self.fetch_failures),
            decompress_failures: get(&self.decompress_failures),
            parse_failures: get(&self.parse_failures),
            records_seen: get(&self.records_seen),
            malformed_records: get(&self.malformed_records),
            records_matched: get(&self.records_matched),
        }
    }
}

/// Final statistics of a run.
///
/// Objects that failed to fetch, decompress, or parse still count as
/// processed; the failure counters tell them apart from objects that simply
/// held nothing relevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub shards: usize,
    pub shards_failed: usize,
    pub files_listed: usize,
    pub files_processed: usize,
    pub fetch_failures: usize,
    pub decompress_failures: usize,
    pub parse_failures: usize,
    pub records_seen: usize,
    pub malformed_records: usize,
    /// Successful records attributed to the target principal
    pub records_matched: usize,
}

impl RunStats {
    /// Objects that contributed no records because of an error
    pub fn failed_files(&self) -> usize {
        self.fetch_failures + self.decompress_failures + self.parse_failures
    }
}
