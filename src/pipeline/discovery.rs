//! Shard discovery.
//!
//! CloudTrail archives are laid out as
//! `AWSLogs/<account>/CloudTrail/<region>/<yyyy>/<mm>/<dd>/`. Walking a few
//! delimiter levels down from the base prefix turns one long serial listing
//! into many small ones that can run concurrently.

use crate::storage::ObjectStore;
use anyhow::{Context, Result};
use tracing::debug;

const DELIMITER: &str = "/";

/// Independently listable partitions of an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardLayout {
    /// Leaf prefixes, each to be listed recursively
    pub prefixes: Vec<String>,
    /// Objects found directly at a level that also had child prefixes.
    /// Listing only the leaf prefixes would miss them.
    pub loose_keys: Vec<String>,
}

/// Children of one prefix at a single delimiter level
struct Level {
    prefixes: Vec<String>,
    keys: Vec<String>,
}

async fn list_level(store: &dyn ObjectStore, prefix: &str) -> Result<Level> {
    let mut level = Level {
        prefixes: Vec::new(),
        keys: Vec::new(),
    };
    let mut token = None;

    loop {
        let page = store
            .list_page(prefix, Some(DELIMITER), token)
            .await
            .with_context(|| {
                format!(
                    "Failed to discover shards under {} (prefix {prefix:?})",
                    store.location()
                )
            })?;
        level.prefixes.extend(page.common_prefixes);
        level.keys.extend(page.keys);

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(level)
}

/// Discover leaf prefixes up to `max_depth` delimiter levels below `base`.
///
/// A prefix without children is a leaf and is kept even when its siblings
/// expand further. When `base` itself has no children the result is just
/// `base`. Any listing error is returned; discovery does not tolerate
/// partial failure.
pub async fn discover_shards(
    store: &dyn ObjectStore,
    base: &str,
    max_depth: usize,
) -> Result<ShardLayout> {
    let mut layout = ShardLayout::default();
    let mut frontier = vec![base.to_string()];

    for depth in 0..max_depth {
        let mut next = Vec::new();

        for prefix in frontier {
            let level = list_level(store, &prefix).await?;
            if level.prefixes.is_empty() {
                layout.prefixes.push(prefix);
            } else {
                next.extend(level.prefixes);
                layout
                    .loose_keys
                    .extend(level.keys.into_iter().filter(|k| !k.ends_with(DELIMITER)));
            }
        }

        debug!(depth, expanded = next.len(), "shard discovery level");
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }

    layout.prefixes.extend(frontier);
    layout.prefixes.sort();
    layout.loose_keys.sort();
    Ok(layout)
}
