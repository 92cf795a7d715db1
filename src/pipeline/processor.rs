//! Per-object log processing.
//!
//! Every failure mode here is "skip and continue": an object that cannot be
//! fetched, decompressed, or parsed contributes nothing, and a malformed
//! record costs only itself. Failures are counted, never retried.

use super::findings::Findings;
use super::stats::StatsCounters;
use crate::audit::identity::PrincipalArn;
use crate::audit::parser::{decode_records, decode_trail_file, DecodeError};
use crate::audit::types::TrailRecord;
use crate::storage::ObjectStore;
use std::sync::Arc;
use tracing::debug;

/// What a single record contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub matched: bool,
    pub secrets: usize,
}

/// Applies the identity and success filters to records and feeds the shared
/// findings.
#[derive(Clone)]
pub struct LogRecordProcessor {
    store: Arc<dyn ObjectStore>,
    target: PrincipalArn,
    findings: Arc<Findings>,
    stats: Arc<StatsCounters>,
}

impl LogRecordProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        target: PrincipalArn,
        findings: Arc<Findings>,
        stats: Arc<StatsCounters>,
    ) -> Self {
        Self {
            store,
            target,
            findings,
            stats,
        }
    }

    /// Fetch, decode, and ingest one object.
    pub async fn process(&self, key: &str) {
        let bytes = match self.store.get_object(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(key, error = %e, "skipping object: fetch failed");
                StatsCounters::add(&self.stats.fetch_failures, 1);
                return;
            }
        };

        // Decompression and JSON parsing are CPU bound.
        let decoded = tokio::task::spawn_blocking(move || {
            decode_trail_file(&bytes).map(decode_records)
        })
        .await;

        let decoded = match decoded {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(e)) => {
                debug!(key, error = %e, "skipping object: decode failed");
                let counter = match e {
                    DecodeError::Decompress(_) => &self.stats.decompress_failures,
                    DecodeError::Parse(_) => &self.stats.parse_failures,
                };
                StatsCounters::add(counter, 1);
                return;
            }
            Err(e) => {
                debug!(key, error = %e, "skipping object: decoder task failed");
                StatsCounters::add(&self.stats.decompress_failures, 1);
                return;
            }
        };

        StatsCounters::add(&self.stats.malformed_records, decoded.malformed);
        StatsCounters::add(
            &self.stats.records_seen,
            decoded.records.len() + decoded.malformed,
        );
        for record in &decoded.records {
            self.ingest(record);
        }
    }

    /// Apply one record to the findings.
    ///
    /// Secret retrieval is recorded for every principal and regardless of
    /// the call's outcome; the action ledger only takes successful calls by
    /// the target principal.
    pub fn ingest(&self, record: &TrailRecord) -> RecordOutcome {
        let mut outcome = RecordOutcome::default();

        if !record.is_error() && self.target.matches(record.principal_arn()) {
            self.findings
                .record_action(&record.operation_key(), &record.event_time);
            StatsCounters::add(&self.stats.records_matched, 1);
            outcome.matched = true;
        }

        for secret_id in record.retrieved_secret_ids() {
            self.findings.record_secret(secret_id);
            outcome.secrets += 1;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const TARGET: &str = "arn:aws:iam::111122223333:role/Admin";

    fn gzip(data: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn processor(store: MemoryStore) -> (LogRecordProcessor, Arc<Findings>, Arc<StatsCounters>) {
        let findings = Arc::new(Findings::new());
        let stats = Arc::new(StatsCounters::default());
        let processor = LogRecordProcessor::new(
            Arc::new(store),
            PrincipalArn::new(TARGET),
            Arc::clone(&findings),
            Arc::clone(&stats),
        );
        (processor, findings, stats)
    }

    fn record(json: &str) -> TrailRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_matching_session_recorded() {
        let (processor, findings, _) = processor(MemoryStore::default());
        let outcome = processor.ingest(&record(
            r#"{"eventTime": "2024-01-15T10:00:00Z", "eventSource": "ec2.amazonaws.com",
                "eventName": "DescribeInstances",
                "userIdentity": {"arn": "arn:aws:sts::111122223333:assumed-role/Admin/bob"}}"#,
        ));
        assert!(outcome.matched);
        assert_eq!(
            findings.last_seen("ec2:DescribeInstances").as_deref(),
            Some("2024-01-15T10:00:00Z")
        );
    }

    #[test]
    fn test_failed_call_not_recorded() {
        let (processor, findings, _) = processor(MemoryStore::default());
        let outcome = processor.ingest(&record(
            r#"{"eventTime": "2024-01-15T10:00:00Z", "eventSource": "iam.amazonaws.com",
                "eventName": "CreateUser", "errorCode": "AccessDenied",
                "userIdentity": {"arn": "arn:aws:sts::111122223333:assumed-role/Admin/bob"}}"#,
        ));
        assert!(!outcome.matched);
        assert!(findings.view().actions.is_empty());
    }

    #[test]
    fn test_other_principal_not_recorded() {
        let (processor, findings, _) = processor(MemoryStore::default());
        processor.ingest(&record(
            r#"{"eventTime": "2024-01-15T10:00:00Z", "eventSource": "s3.amazonaws.com",
                "eventName": "ListBuckets",
                "userIdentity": {"arn": "arn:aws:iam::111122223333:user/mallory"}}"#,
        ));
        assert!(findings.view().actions.is_empty());
    }

    #[test]
    fn test_secret_from_any_principal() {
        let (processor, findings, _) = processor(MemoryStore::default());
        let outcome = processor.ingest(&record(
            r#"{"eventTime": "2024-01-15T10:00:00Z",
                "eventSource": "secretsmanager.amazonaws.com", "eventName": "GetSecretValue",
                "userIdentity": {"arn": "arn:aws:iam::111122223333:user/mallory"},
                "requestParameters": {"secretId": "prod/db"}}"#,
        ));
        assert_eq!(outcome.secrets, 1);
        let view = findings.view();
        assert_eq!(view.secrets, vec!["prod/db"]);
        assert!(view.actions.is_empty());
    }

    #[tokio::test]
    async fn test_process_object_counts_records() {
        let store = MemoryStore::default().with_object(
            "logs/a.json.gz",
            gzip(
                r#"{"Records": [
                    {"eventTime": "2024-01-15T10:00:00Z", "eventSource": "ec2.amazonaws.com",
                     "eventName": "DescribeInstances",
                     "userIdentity": {"arn": "arn:aws:iam::111122223333:role/Admin"}},
                    {"eventName": ["broken"]}
                ]}"#,
            ),
        );
        let (processor, findings, stats) = processor(store);
        processor.process("logs/a.json.gz").await;

        let stats = stats.snapshot();
        assert_eq!(stats.records_seen, 2);
        assert_eq!(stats.malformed_records, 1);
        assert_eq!(stats.records_matched, 1);
        assert_eq!(findings.view().actions.len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_counted_separately() {
        let store = MemoryStore::default()
            .with_object("bad-json.gz", gzip("{ nope"))
            .with_object(
                "bad-gzip.gz",
                vec![
                    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x07, 0x00, 0x00,
                ],
            )
            .with_object("unreachable.gz", gzip(r#"{"Records": []}"#))
            .with_failing_fetch("unreachable.gz");
        let (processor, _, stats) = processor(store);

        processor.process("bad-json.gz").await;
        processor.process("bad-gzip.gz").await;
        processor.process("unreachable.gz").await;
        processor.process("missing.gz").await;

        let stats = stats.snapshot();
        assert_eq!(stats.parse_failures, 1);
        assert_eq!(stats.decompress_failures, 1);
        assert_eq!(stats.fetch_failures, 2);
    }
}
