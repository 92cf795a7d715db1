//! Thread-safe accumulation of analysis results.
//!
//! [`Findings`] owns the action ledger (operation -> latest successful
//! timestamp) and the secret set behind a single lock. Workers only ever
//! call the two atomic update operations; the lock is held for the in-memory
//! update alone and never across I/O.

use super::stats::RunStats;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    actions: HashMap<String, String>,
    secrets: HashSet<String>,
}

/// Shared accumulator written by every processing worker
#[derive(Debug, Default)]
pub struct Findings {
    inner: Mutex<Inner>,
}

/// One operation the principal was observed performing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionObservation {
    /// `<service>:<eventName>`
    pub operation: String,
    /// Timestamp of the most recent successful call
    pub last_seen: String,
}

/// Sorted, read-only view of the findings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingsView {
    pub actions: Vec<ActionObservation>,
    pub secrets: Vec<String>,
}

/// Complete result of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub identity: String,
    pub actions: Vec<ActionObservation>,
    pub secrets: Vec<String>,
    pub stats: RunStats,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking worker cannot leave the maps half-updated, so the data
        // stays usable after poisoning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `timestamp` for `operation` if it is the first or a later one.
    ///
    /// Timestamps are ISO 8601 strings, so lexical order is time order.
    pub fn record_action(&self, operation: &str, timestamp: &str) {
        let mut inner = self.lock();
        match inner.actions.entry(operation.to_string()) {
            Entry::Occupied(mut existing) => {
                if timestamp > existing.get().as_str() {
                    existing.insert(timestamp.to_string());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(timestamp.to_string());
            }
        }
    }

    /// Add a secret identifier to the set.
    pub fn record_secret(&self, secret_id: &str) {
        let mut inner = self.lock();
        if !inner.secrets.contains(secret_id) {
            inner.secrets.insert(secret_id.to_string());
        }
    }

    /// Latest timestamp recorded for `operation`
    #[cfg(test)]
    pub fn last_seen(&self, operation: &str) -> Option<String> {
        self.lock().actions.get(operation).cloned()
    }

    /// Lexically sorted snapshot of the current findings.
    pub fn view(&self) -> FindingsView {
        let inner = self.lock();

        let mut actions: Vec<ActionObservation> = inner
            .actions
            .iter()
            .map(|(operation, last_seen)| ActionObservation {
                operation: operation.clone(),
                last_seen: last_seen.clone(),
            })
            .collect();
        actions.sort_by(|a, b| a.operation.cmp(&b.operation));

        let secrets: BTreeSet<&String> = inner.secrets.iter().collect();

        FindingsView {
            actions,
            secrets: secrets.into_iter().cloned().collect(),
        }
    }
}
