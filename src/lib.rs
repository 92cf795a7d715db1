//! # CloudTrail Audit Tools
//!
//! Reconstruct what an AWS principal has actually done from a CloudTrail
//! archive, without access to its IAM policies.
//!
//! ## Overview
//!
//! The only evidence assumed is read access to the bucket CloudTrail
//! delivers to. Every log file under a prefix is fetched, decompressed, and
//! scanned for successful calls made by one principal. The result is the set
//! of `service:Operation` actions it performed, each with the most recent
//! time it was seen. As a side channel, the ids of any Secrets Manager
//! secrets retrieved by *any* principal are collected too.
//!
//! ## Features
//!
//! - **Parallel listing** - the archive is split into shard prefixes
//!   (region/year/month/day) that are listed concurrently
//! - **Worker pool processing** - a bounded number of log files in flight
//! - **Identity canonicalization** - assumed-role sessions are folded into
//!   their role, so one role's activity is reported once
//! - **Failure tolerance** - unreadable shards and files are counted and
//!   skipped instead of aborting the run
//! - **Compressed payloads** - gzip (as delivered by CloudTrail), zstd, or
//!   plain JSON
//! - **Offline archives** - `analyze-local` works on a synced directory
//! - **Text, CSV, and JSON reports**
//!
//! ## Architecture
//!
//! - [`audit`] - CloudTrail record types, decoding, and ARN normalization
//! - [`storage`] - the [`storage::ObjectStore`] abstraction with S3, local
//!   directory, and in-memory backends
//! - [`pipeline`] - shard discovery, listing, processing, and aggregation
//! - [`commands`] - the CLI commands and report rendering
//! - [`aws_api`] - AWS configuration and caller identity
//! - [`config`] - settings passed through the pipeline
//! - [`utils`] - decompression, worker pool, progress, and formatting
//!
//! ## Example Usage
//!
//! ```bash
//! # Actions of the current credentials
//! cloudtrail-audit analyze --bucket org-trail --prefix AWSLogs/111122223333/CloudTrail/
//!
//! # A specific role, with more workers and a JSON export
//! cloudtrail-audit analyze --bucket org-trail --prefix AWSLogs/ \
//!     --identity arn:aws:iam::111122223333:role/Deploy --threads 32 -o deploy.json
//!
//! # A local copy of the archive
//! cloudtrail-audit analyze-local ./mirror --identity arn:aws:iam::111122223333:user/alice
//! ```
//!
//! Library use goes through [`pipeline::Orchestrator`] with any
//! [`storage::ObjectStore`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use cloudtrail_audit_tools::audit::identity::PrincipalArn;
//! use cloudtrail_audit_tools::config::PipelineConfig;
//! use cloudtrail_audit_tools::pipeline::{Orchestrator, SilentObserver};
//! use cloudtrail_audit_tools::storage::LocalStore;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let store = Arc::new(LocalStore::new("./mirror"));
//! let target = PrincipalArn::new("arn:aws:iam::111122223333:role/Deploy");
//! let report = Orchestrator::new(store, PipelineConfig::default())
//!     .run("AWSLogs/", &target, Arc::new(SilentObserver))
//!     .await?;
//! for action in &report.actions {
//!     println!("{} {}", action.operation, action.last_seen);
//! }
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod aws_api;
pub mod commands;
pub mod config;
pub mod pipeline;
pub mod storage;
pub mod utils;
