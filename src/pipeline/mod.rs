//! The analysis pipeline.
//!
//! ```text
//! discovery -> lister -> worker pool (processor) -> findings
//! ```
//!
//! - [`discovery`] - find independently listable shard prefixes
//! - [`lister`] - list every object key across shards in parallel
//! - [`processor`] - fetch, decode, and filter one log file
//! - [`findings`] - shared result accumulator and report types
//! - [`orchestrator`] - wires the stages together
//! - [`stats`] - run counters

pub mod discovery;
pub mod findings;
pub mod lister;
pub mod orchestrator;
pub mod processor;
pub mod stats;

pub use discovery::{discover_shards, ShardLayout};
pub use findings::{ActionObservation, AnalysisReport, Findings, FindingsView};
pub use lister::{list_shards, ListingOutcome};
pub use orchestrator::Orchestrator;
pub use processor::LogRecordProcessor;
pub use stats::{RunStats, StatsCounters};

/// Receives progress updates while the pipeline runs.
///
/// Callbacks arrive from worker tasks concurrently, so `done` counts may be
/// observed slightly out of order.
pub trait PipelineObserver: Send + Sync {
    fn shards_discovered(&self, _shards: usize) {}
    fn shard_listed(&self, _done: usize, _total: usize) {}
    fn files_discovered(&self, _files: usize) {}
    fn file_processed(&self, _done: usize, _total: usize) {}
}

/// Observer that ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}
