//! Object storage access.
//!
//! The pipeline only needs two capabilities from an archive: paginated key
//! listing with delimiter grouping, and whole-object retrieval. Both are
//! captured by [`ObjectStore`], which has three implementations:
//!
//! - [`s3::S3Store`] - an S3 (or S3-compatible) bucket
//! - [`local::LocalStore`] - a directory mirror of an archive
//! - [`memory::MemoryStore`] - in-memory objects, with failure injection

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

/// One page of a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Object keys on this page
    pub keys: Vec<String>,
    /// Child prefixes grouped by the delimiter (empty without a delimiter)
    pub common_prefixes: Vec<String>,
    /// Token for the next page; `None` when the listing is exhausted
    pub next_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to list {location} (prefix {prefix:?}): {message}")]
    List {
        location: String,
        prefix: String,
        message: String,
    },
    #[error("failed to fetch {location}/{key}: {message}")]
    Fetch {
        location: String,
        key: String,
        message: String,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read access to a log archive.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable archive location, e.g. `s3://bucket`
    fn location(&self) -> String;

    /// List one page of keys under `prefix`.
    ///
    /// With a delimiter, keys containing the delimiter after the prefix are
    /// rolled up into `common_prefixes` instead of being returned.
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation: Option<String>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch the raw bytes of one object.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// Group `keys` (sorted) the way an S3 delimiter listing does.
///
/// Shared by the non-S3 stores so their listings behave identically.
pub(crate) fn group_by_delimiter<'a>(
    keys: impl Iterator<Item = &'a str>,
    prefix: &str,
    delimiter: Option<&str>,
) -> (Vec<String>, Vec<String>) {
    let mut objects = Vec::new();
    let mut prefixes: Vec<String> = Vec::new();

    for key in keys.filter(|k| k.starts_with(prefix)) {
        let rest = &key[prefix.len()..];
        match delimiter.and_then(|d| rest.find(d).map(|idx| idx + d.len())) {
            Some(end) => {
                let common = format!("{prefix}{}", &rest[..end]);
                if prefixes.last() != Some(&common) {
                    prefixes.push(common);
                }
            }
            None => objects.push(key.to_string()),
        }
    }

    (objects, prefixes)
}
