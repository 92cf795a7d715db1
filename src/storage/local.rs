//! Directory-backed object store.
//!
//! Lets an archive that was synced to disk (e.g. with `aws s3 sync`) be
//! analyzed offline. Object keys are paths relative to the root directory,
//! always using `/` as the separator.

use super::{group_by_delimiter, ListPage, ObjectStore, StoreError};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Recursively collect file keys under `dir`, relative to `root`.
fn collect_keys(root: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<(), StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| LocalStore::io_error(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LocalStore::io_error(dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| LocalStore::io_error(&path, e))?;

        if file_type.is_dir() {
            collect_keys(root, &path, keys)?;
        } else if file_type.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn location(&self) -> String {
        format!("file://{}", self.root.display())
    }

    /// Local listings are returned as a single page.
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        _continuation: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let root = self.root.clone();
        let prefix_owned = prefix.to_string();
        let delimiter_owned = delimiter.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            // Only walk the deepest directory the prefix fully names.
            let dir_part = match prefix_owned.rfind('/') {
                Some(idx) => &prefix_owned[..idx],
                None => "",
            };
            let start = root.join(dir_part);

            let mut keys = Vec::new();
            if start.is_dir() {
                collect_keys(&root, &start, &mut keys)?;
            } else if !root.is_dir() {
                return Err(LocalStore::io_error(
                    &root,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "archive root not found"),
                ));
            }
            keys.sort();

            let (objects, prefixes) = group_by_delimiter(
                keys.iter().map(String::as_str),
                &prefix_owned,
                delimiter_owned.as_deref(),
            );
            Ok(ListPage {
                keys: objects,
                common_prefixes: prefixes,
                next_token: None,
            })
        })
        .await
        .map_err(|e| StoreError::List {
            location: self.location(),
            prefix: prefix.to_string(),
            message: e.to_string(),
        })?
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(key);
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, key: &str, contents: &str) {
        let path = root.join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_list_and_fetch() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "AWSLogs/1/CloudTrail/us-east-1/a.json", "A");
        write(dir.path(), "AWSLogs/1/CloudTrail/eu-west-1/b.json", "B");

        let store = LocalStore::new(dir.path());
        let page = store
            .list_page("AWSLogs/1/CloudTrail/", Some("/"), None)
            .await
            .unwrap();
        assert_eq!(
            page.common_prefixes,
            vec![
                "AWSLogs/1/CloudTrail/eu-west-1/",
                "AWSLogs/1/CloudTrail/us-east-1/"
            ]
        );
        assert!(page.keys.is_empty());

        let all = store.list_page("", None, None).await.unwrap();
        assert_eq!(all.keys.len(), 2);

        let bytes = store
            .get_object("AWSLogs/1/CloudTrail/us-east-1/a.json")
            .await
            .unwrap();
        assert_eq!(bytes, b"A".to_vec());
    }

    #[tokio::test]
    async fn test_prefix_of_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let page = store.list_page("nothing/here/", Some("/"), None).await.unwrap();
        assert!(page.keys.is_empty());
        assert!(page.common_prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let store = LocalStore::new("/nonexistent/cloudtrail/archive");
        assert!(store.list_page("", Some("/"), None).await.is_err());
        assert!(store.get_object("a.json").await.is_err());
    }
}
