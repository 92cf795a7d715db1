//! Fixed-width async worker pool.
//!
//! Both pipeline phases (shard listing and object processing) are I/O bound,
//! so work is spread across tokio tasks rather than OS threads. The pool
//! drains a queue that is fully populated and closed before any worker
//! starts; each worker exits once the queue is empty.
//!
//! The pool is not cancellable. Once started it runs every queued item to
//! completion. Callers needing cancellation should check a token inside
//! `work` and return early between items.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Run `work` over every item with at most `workers` items in flight.
///
/// Items are processed in queue order but complete in any order. Returns an
/// error only if a worker task panicked.
pub async fn run_pool<T, F, Fut>(items: Vec<T>, workers: usize, work: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if items.is_empty() {
        return Ok(());
    }

    let workers = workers.clamp(1, items.len());
    let (tx, rx) = mpsc::channel(items.len());
    for item in items {
        // Capacity equals the item count, so this never waits.
        if tx.send(item).await.is_err() {
            return Err(anyhow!("work queue closed before it was populated"));
        }
    }
    drop(tx);

    let queue = Arc::new(Mutex::new(rx));
    let work = Arc::new(work);
    let mut set = JoinSet::new();

    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let work = Arc::clone(&work);
        set.spawn(async move {
            loop {
                // The queue is closed and pre-filled, so recv never parks.
                let next = queue.lock().await.recv().await;
                match next {
                    Some(item) => work(item).await,
                    None => break,
                }
            }
        });
    }

    while let Some(joined) = set.join_next().await {
        joined.map_err(|e| anyhow!("worker task failed: {e}"))?;
    }

    Ok(())
}
