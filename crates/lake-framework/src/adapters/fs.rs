//! Filesystem Lake Store Adapter
//!
//! Serves a local mirror of the lake: one directory per height under the
//! root, holding `block.json` and `shard_{id}.json`.

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::paginate_common_prefixes;
use crate::domain::StoreError;
use crate::ports::{LakeStore, ListPage, ListRequest};

/// Lake store backed by a local directory.
#[derive(Clone, Debug)]
pub struct FsLakeStore {
    root: PathBuf,
}

impl FsLakeStore {
    /// Serve the lake mirrored under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mirror root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::Backend(format!("invalid object key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

fn map_io_error(key: &str, error: io::Error) -> StoreError {
    match error.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            key: key.to_string(),
        },
        _ => StoreError::Backend(format!("{}: {}", key, error)),
    }
}

#[async_trait]
impl LakeStore for FsLakeStore {
    async fn list_common_prefixes(&self, request: ListRequest) -> Result<ListPage, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| map_io_error(&self.root.display().to_string(), e))?;

        let mut prefixes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                prefixes.push(format!("{}{}", name, request.delimiter));
            }
        }
        prefixes.sort();

        debug!(
            "[lake] Listed {} directories under {}",
            prefixes.len(),
            self.root.display()
        );
        Ok(paginate_common_prefixes(
            prefixes.iter().map(String::as_str),
            &request,
        ))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| map_io_error(key, e))
    }

    fn location(&self) -> String {
        format!("file://{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, key: &str, body: &str) {
        let path = root.join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn list_from(start_after: &str, max_keys: usize) -> ListRequest {
        ListRequest {
            delimiter: "/".to_string(),
            max_keys,
            start_after: start_after.to_string(),
            continuation_token: None,
        }
    }

    #[tokio::test]
    async fn test_lists_height_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "000000000101/block.json", "{}");
        write(dir.path(), "000000000100/block.json", "{}");
        write(dir.path(), "000000000099/block.json", "{}");
        write(dir.path(), "notes.txt", "ignored");

        let store = FsLakeStore::new(dir.path());
        let page = store
            .list_common_prefixes(list_from("000000000100", 10))
            .await
            .unwrap();
        assert_eq!(page.common_prefixes, vec!["000000000100/", "000000000101/"]);
    }

    #[tokio::test]
    async fn test_listing_paginates() {
        let dir = tempfile::tempdir().unwrap();
        for h in 1..=3 {
            write(dir.path(), &format!("{:012}/block.json", h), "{}");
        }

        let store = FsLakeStore::new(dir.path());
        let page = store.list_common_prefixes(list_from("", 2)).await.unwrap();
        assert_eq!(page.common_prefixes.len(), 2);
        assert_eq!(
            page.next_continuation_token.as_deref(),
            Some("000000000002/")
        );
    }

    #[tokio::test]
    async fn test_get_object_and_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "000000000100/shard_0.json", "{\"shard_id\":0}");

        let store = FsLakeStore::new(dir.path());
        let body = store.get_object("000000000100/shard_0.json").await.unwrap();
        assert_eq!(body, b"{\"shard_id\":0}".to_vec());

        let err = store.get_object("000000000100/shard_1.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_root_and_location() {
        let store = FsLakeStore::new("/var/lib/lake");
        assert_eq!(store.root(), Path::new("/var/lib/lake"));
        assert_eq!(store.location(), "file:///var/lib/lake");
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLakeStore::new(dir.path());
        let err = store.get_object("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
