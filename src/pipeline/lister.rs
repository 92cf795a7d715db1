//! Parallel object listing across shards.

use super::discovery::ShardLayout;
use super::PipelineObserver;
use crate::storage::ObjectStore;
use crate::utils::parallel::run_pool;
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Keys found across all shards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOutcome {
    pub keys: Vec<String>,
    /// Shards whose listing stopped early because of an error
    pub failed_shards: usize,
}

/// List every key of one shard, page by page.
///
/// Returns the keys gathered so far together with the error that stopped the
/// listing, if any.
async fn list_shard(store: &dyn ObjectStore, prefix: &str) -> (Vec<String>, Option<String>) {
    let mut keys = Vec::new();
    let mut token = None;

    loop {
        match store.list_page(prefix, None, token).await {
            Ok(page) => {
                keys.extend(page.keys.into_iter().filter(|k| !k.ends_with('/')));
                match page.next_token {
                    Some(next) => token = Some(next),
                    None => return (keys, None),
                }
            }
            Err(e) => return (keys, Some(e.to_string())),
        }
    }
}

/// List all shards concurrently with at most `workers` listings in flight.
///
/// A failing shard is logged and abandoned without retry; pages it already
/// returned are kept and the other shards are unaffected. Loose keys from
/// discovery are included as-is.
pub async fn list_shards(
    store: Arc<dyn ObjectStore>,
    layout: ShardLayout,
    workers: usize,
    observer: Arc<dyn PipelineObserver>,
) -> Result<ListingOutcome> {
    let total = layout.prefixes.len();
    let collected = Arc::new(Mutex::new(layout.loose_keys));
    let failed = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    {
        let collected = Arc::clone(&collected);
        let failed = Arc::clone(&failed);
        run_pool(layout.prefixes, workers, move |prefix: String| {
            let store = Arc::clone(&store);
            let collected = Arc::clone(&collected);
            let failed = Arc::clone(&failed);
            let done = Arc::clone(&done);
            let observer = Arc::clone(&observer);
            async move {
                let (keys, error) = list_shard(store.as_ref(), &prefix).await;
                if let Some(message) = error {
                    warn!(shard = %prefix, kept = keys.len(), "listing failed: {message}");
                    failed.fetch_add(1, Ordering::Relaxed);
                }

                collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(keys);

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                observer.shard_listed(finished, total);
            }
        })
        .await?;
    }

    let mut keys = std::mem::take(&mut *collected.lock().unwrap_or_else(PoisonError::into_inner));
    keys.sort();
    keys.dedup();

    Ok(ListingOutcome {
        keys,
        failed_shards: failed.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentObserver;
    use crate::storage::MemoryStore;

    fn layout(prefixes: &[&str]) -> ShardLayout {
        ShardLayout {
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            loose_keys: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_lists_all_pages_of_all_shards() {
        let mut store = MemoryStore::default().with_page_size(3);
        for region in ["us-east-1", "eu-west-1"] {
            for n in 0..10 {
                store.insert(&format!("logs/{region}/{n:02}.json.gz"), "");
            }
        }

        let outcome = list_shards(
            Arc::new(store),
            layout(&["logs/us-east-1/", "logs/eu-west-1/"]),
            4,
            Arc::new(SilentObserver),
        )
        .await
        .unwrap();

        assert_eq!(outcome.keys.len(), 20);
        assert_eq!(outcome.failed_shards, 0);
    }

    #[tokio::test]
    async fn test_failing_shard_keeps_partial_results() {
        let mut store = MemoryStore::default().with_page_size(2);
        for n in 0..5 {
            store.insert(&format!("a/{n}.json.gz"), "");
            store.insert(&format!("b/{n}.json.gz"), "");
        }
        let store = store.with_failing_listing("b/", 1);

        let outcome = list_shards(
            Arc::new(store),
            layout(&["a/", "b/"]),
            2,
            Arc::new(SilentObserver),
        )
        .await
        .unwrap();

        assert_eq!(outcome.failed_shards, 1);
        // All of shard a, plus the first page of shard b.
        assert_eq!(outcome.keys.len(), 7);
        assert!(outcome.keys.contains(&"b/0.json.gz".to_string()));
        assert!(!outcome.keys.contains(&"b/4.json.gz".to_string()));
    }

    #[tokio::test]
    async fn test_loose_keys_included_and_placeholders_skipped() {
        let store = MemoryStore::default()
            .with_object("root/x/", "")
            .with_object("root/x/1.json.gz", "");
        let layout = ShardLayout {
            prefixes: vec!["root/x/".to_string()],
            loose_keys: vec!["root/loose.json.gz".to_string()],
        };

        let outcome = list_shards(Arc::new(store), layout, 1, Arc::new(SilentObserver))
            .await
            .unwrap();
        assert_eq!(outcome.keys, vec!["root/loose.json.gz", "root/x/1.json.gz"]);
    }
}
