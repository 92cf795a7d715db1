//! Analyze a CloudTrail archive stored in S3.
//!
//! Loads AWS configuration from the standard provider chain, resolves the
//! target principal (the caller's own identity unless `--identity` is
//! given), then runs the pipeline over every log file under the prefix.
//!
//! # Usage
//!
//! ```bash
//! # What can my current credentials do?
//! cloudtrail-audit analyze --bucket org-trail --prefix AWSLogs/111122223333/CloudTrail/
//!
//! # Another principal, exported as CSV
//! cloudtrail-audit analyze --bucket org-trail --prefix AWSLogs/ \
//!     --identity arn:aws:iam::111122223333:role/Deploy -o deploy.csv
//! ```

use super::report::{self, ReportDestination};
use crate::audit::identity::PrincipalArn;
use crate::aws_api::AwsSession;
use crate::config::S3Settings;
use crate::pipeline::{AnalysisReport, Orchestrator, PipelineObserver};
use crate::storage::S3Store;
use crate::utils::progress::ConsoleProgress;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the analysis and return the report without printing it.
pub async fn analyze(
    settings: &S3Settings,
    observer: Arc<dyn PipelineObserver>,
) -> Result<AnalysisReport> {
    let session = AwsSession::from_options(
        settings.profile.as_deref(),
        settings.region.as_deref(),
        settings.endpoint_url.as_deref(),
    )
    .await;

    let target = match explicit_target(settings.identity.as_deref()) {
        Some(target) => target,
        None => {
            let identity = session
                .caller_identity()
                .await
                .context("No --identity given and the caller identity could not be resolved")?;
            eprintln!("Using caller identity: {identity}");
            identity
        }
    };

    let store = S3Store::new(session.s3_client(), &settings.bucket);
    eprintln!(
        "Analyzing s3://{}/{} for {}",
        settings.bucket, settings.prefix, target
    );

    Orchestrator::new(Arc::new(store), settings.pipeline)
        .run(&settings.prefix, &target, observer)
        .await
}

/// The `--identity` target, if one was given. A blank value counts as
/// absent so the caller identity is used instead.
fn explicit_target(identity: Option<&str>) -> Option<PrincipalArn> {
    identity
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PrincipalArn::new)
}

pub async fn run(settings: &S3Settings) -> Result<()> {
    let destination = ReportDestination::from_settings(&settings.output)?;
    let report = analyze(settings, Arc::new(ConsoleProgress::new())).await?;
    report::emit(&report, destination.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identity_falls_back_to_caller() {
        assert_eq!(explicit_target(None), None);
        assert_eq!(explicit_target(Some("")), None);
        assert_eq!(explicit_target(Some("   ")), None);
    }

    #[test]
    fn test_explicit_identity_is_normalized() {
        assert_eq!(
            explicit_target(Some(" arn:aws:sts::1:assumed-role/Deploy/ci ")),
            Some(PrincipalArn::new("arn:aws:iam::1:role/Deploy"))
        );
    }
}
