//! In-memory object store.
//!
//! Behaves like an S3 bucket for listing purposes (lexical key order,
//! delimiter grouping, bounded page size) and supports injecting listing and
//! fetch failures, which makes it the store of choice for exercising the
//! pipeline's error tolerance.

use super::{group_by_delimiter, ListPage, ObjectStore, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    objects: BTreeMap<String, Vec<u8>>,
    page_size: usize,
    /// prefix -> number of pages served before listing fails
    failing_listings: HashMap<String, usize>,
    failing_keys: HashSet<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            objects: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            failing_listings: HashMap::new(),
            failing_keys: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_object(mut self, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(key, bytes);
        self
    }

    pub fn insert(&mut self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects.insert(key.to_string(), bytes.into());
    }

    /// Make listings of exactly `prefix` fail once `pages_served` pages
    /// have been returned.
    #[must_use]
    pub fn with_failing_listing(mut self, prefix: &str, pages_served: usize) -> Self {
        self.failing_listings
            .insert(prefix.to_string(), pages_served);
        self
    }

    /// Make fetches of `key` fail.
    #[must_use]
    pub fn with_failing_fetch(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn location(&self) -> String {
        format!("memory://{}", self.name)
    }

    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let offset = match continuation {
            Some(token) => token.parse::<usize>().map_err(|_| StoreError::List {
                location: self.location(),
                prefix: prefix.to_string(),
                message: format!("invalid continuation token {token:?}"),
            })?,
            None => 0,
        };

        if let Some(&served) = self.failing_listings.get(prefix) {
            if offset / self.page_size >= served {
                return Err(StoreError::List {
                    location: self.location(),
                    prefix: prefix.to_string(),
                    message: "injected listing failure".to_string(),
                });
            }
        }

        let (objects, prefixes) =
            group_by_delimiter(self.objects.keys().map(String::as_str), prefix, delimiter);

        // S3 interleaves keys and common prefixes in one lexical sequence.
        let mut entries: Vec<(String, bool)> = objects
            .into_iter()
            .map(|k| (k, false))
            .chain(prefixes.into_iter().map(|p| (p, true)))
            .collect();
        entries.sort();

        let end = (offset + self.page_size).min(entries.len());
        let mut page = ListPage::default();
        for (entry, is_prefix) in entries.get(offset..end).unwrap_or_default() {
            if *is_prefix {
                page.common_prefixes.push(entry.clone());
            } else {
                page.keys.push(entry.clone());
            }
        }
        if end < entries.len() {
            page.next_token = Some(end.to_string());
        }

        Ok(page)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        if self.failing_keys.contains(key) {
            return Err(StoreError::Fetch {
                location: self.location(),
                key: key.to_string(),
                message: "injected fetch failure".to_string(),
            });
        }

        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Fetch {
                location: self.location(),
                key: key.to_string(),
                message: "no such key".to_string(),
            })
    }
}
