//! Drives a complete analysis run.

use super::discovery::discover_shards;
use super::findings::{AnalysisReport, Findings};
use super::lister::list_shards;
use super::processor::LogRecordProcessor;
use super::stats::StatsCounters;
use super::PipelineObserver;
use crate::audit::identity::PrincipalArn;
use crate::config::PipelineConfig;
use crate::storage::ObjectStore;
use crate::utils::parallel::run_pool;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Discovery, listing, and processing over one archive.
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn ObjectStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Analyze every log file under `base_prefix` for `target`.
    ///
    /// Fails only when shard discovery fails or a worker panics; unreadable
    /// shards and objects are skipped and show up in the run statistics.
    /// The run cannot be cancelled once started.
    pub async fn run(
        &self,
        base_prefix: &str,
        target: &PrincipalArn,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<AnalysisReport> {
        let counters = Arc::new(StatsCounters::default());
        let findings = Arc::new(Findings::new());

        info!(location = %self.store.location(), prefix = base_prefix, "discovering shards");
        let layout =
            discover_shards(self.store.as_ref(), base_prefix, self.config.shard_depth).await?;
        StatsCounters::add(&counters.shards, layout.prefixes.len());
        observer.shards_discovered(layout.prefixes.len());

        let listing = list_shards(
            Arc::clone(&self.store),
            layout,
            self.config.threads,
            Arc::clone(&observer),
        )
        .await?;
        StatsCounters::add(&counters.shards_failed, listing.failed_shards);
        StatsCounters::add(&counters.files_listed, listing.keys.len());
        observer.files_discovered(listing.keys.len());

        let total = listing.keys.len();
        info!(files = total, workers = self.config.threads, "processing log files");

        let processor = LogRecordProcessor::new(
            Arc::clone(&self.store),
            target.clone(),
            Arc::clone(&findings),
            Arc::clone(&counters),
        );
        {
            let counters = Arc::clone(&counters);
            run_pool(listing.keys, self.config.threads, move |key: String| {
                let processor = processor.clone();
                let counters = Arc::clone(&counters);
                let observer = Arc::clone(&observer);
                async move {
                    processor.process(&key).await;
                    let done = StatsCounters::add(&counters.files_processed, 1);
                    observer.file_processed(done, total);
                }
            })
            .await?;
        }

        let view = findings.view();
        let stats = counters.snapshot();
        info!(
            actions = view.actions.len(),
            secrets = view.secrets.len(),
            failed_files = stats.failed_files(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            identity: target.to_string(),
            actions: view.actions,
            secrets: view.secrets,
            stats,
        })
    }
}
