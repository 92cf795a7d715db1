//! Analyze a local mirror of a CloudTrail archive.
//!
//! Useful for archives synced with `aws s3 sync` or exported from another
//! account. The directory tree is treated exactly like the bucket's key
//! space, so `--prefix` and shard discovery behave as they do against S3.
//!
//! # Usage
//!
//! ```bash
//! cloudtrail-audit analyze-local ./trail-mirror \
//!     --prefix AWSLogs/111122223333/CloudTrail/ \
//!     --identity arn:aws:iam::111122223333:user/alice
//! ```

use super::report::{self, ReportDestination};
use crate::audit::identity::PrincipalArn;
use crate::config::LocalSettings;
use crate::pipeline::{AnalysisReport, Orchestrator, PipelineObserver};
use crate::storage::LocalStore;
use crate::utils::progress::ConsoleProgress;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Run the analysis and return the report without printing it.
pub async fn analyze(
    settings: &LocalSettings,
    observer: Arc<dyn PipelineObserver>,
) -> Result<AnalysisReport> {
    if settings.identity.trim().is_empty() {
        bail!("--identity must not be empty");
    }
    if !settings.root.is_dir() {
        bail!("Archive directory not found: {}", settings.root.display());
    }

    let target = PrincipalArn::new(settings.identity.trim());
    eprintln!(
        "Analyzing {} (prefix {:?}) for {}",
        settings.root.display(),
        settings.prefix,
        target
    );

    Orchestrator::new(Arc::new(LocalStore::new(settings.root.clone())), settings.pipeline)
        .run(&settings.prefix, &target, observer)
        .await
}

pub async fn run(settings: &LocalSettings) -> Result<()> {
    let destination = ReportDestination::from_settings(&settings.output)?;
    let report = analyze(settings, Arc::new(ConsoleProgress::new())).await?;
    report::emit(&report, destination.as_ref())
}
