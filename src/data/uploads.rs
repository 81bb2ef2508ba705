use crate::domain::repository::{Upload, UploadStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 8;

/// Stored name for an upload: a fresh UUID plus the original extension when it is sane.
pub fn stored_name(file_name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext)
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{}.{}", id, ext.to_ascii_lowercase())
        }
        _ => id,
    }
}

/// Names handed out by [`stored_name`] never contain path separators or dots
/// beyond the extension; anything else is rejected before touching the disk.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !name.starts_with('.')
        && name.matches('.').count() <= 1
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadMeta {
    file_name: String,
    content_type: String,
}

/// Keeps each upload as a file plus a JSON sidecar with its metadata.
pub struct FsUploadStore {
    root: PathBuf,
}

impl FsUploadStore {
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;
        info!(path = %root.display(), "Upload directory ready");
        Ok(Self { root })
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.meta.json", name))
    }
}

#[async_trait]
impl UploadStore for FsUploadStore {
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, bytes = upload.bytes.len()))]
    async fn save(&self, upload: Upload) -> Result<String> {
        let name = stored_name(&upload.file_name);
        let meta = UploadMeta {
            file_name: upload.file_name,
            content_type: upload.content_type,
        };
        // Sidecar first: a data file without one is never served
        tokio::fs::write(self.meta_path(&name), serde_json::to_vec(&meta)?).await?;
        if let Err(e) = tokio::fs::write(self.root.join(&name), &upload.bytes).await {
            warn!(name = %name, error = %e, "Failed to write upload; removing sidecar");
            let _ = tokio::fs::remove_file(self.meta_path(&name)).await;
            return Err(e).with_context(|| format!("Failed to write upload {}", name));
        }
        debug!(name = %name, "Upload written to disk");
        Ok(name)
    }

    #[instrument(skip(self))]
    async fn load(&self, name: &str) -> Result<Option<Upload>> {
        if !is_valid_name(name) {
            return Ok(None);
        }
        let Some(meta) = read_if_exists(&self.meta_path(name)).await? else {
            return Ok(None);
        };
        let Some(bytes) = read_if_exists(&self.root.join(name)).await? else {
            return Ok(None);
        };
        let meta: UploadMeta = serde_json::from_slice(&meta)
            .with_context(|| format!("Corrupt metadata for upload {}", name))?;
        Ok(Some(Upload {
            file_name: meta.file_name,
            content_type: meta.content_type,
            bytes,
        }))
    }
}

async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUploadStore {
    files: Arc<RwLock<HashMap<String, Upload>>>,
}

impl InMemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadStore for InMemoryUploadStore {
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, bytes = upload.bytes.len()))]
    async fn save(&self, upload: Upload) -> Result<String> {
        let name = stored_name(&upload.file_name);
        self.files.write().await.insert(name.clone(), upload);
        Ok(name)
    }

    async fn load(&self, name: &str) -> Result<Option<Upload>> {
        Ok(self.files.read().await.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn photo() -> Upload {
        Upload {
            file_name: "breakfast.JPG".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8, 0xff, 0xe0],
        }
    }

    #[test]
    fn test_stored_name_keeps_safe_extension() {
        assert!(stored_name("photo.PNG").ends_with(".png"));
        assert!(!stored_name("archive.tar.gz/../../etc").contains('/'));
        assert!(!stored_name("noext").contains('.'));
        assert!(!stored_name("weird.ex$t").contains('$'));
    }

    #[test]
    fn test_is_valid_name_rejects_traversal() {
        assert!(!is_valid_name("../secret"));
        assert!(!is_valid_name(".hidden"));
        assert!(!is_valid_name("a/b"));
        assert!(is_valid_name(&stored_name("photo.png")));
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsUploadStore::open(dir.path().join("uploads")).await.unwrap();

        let name = store.save(photo()).await.unwrap();
        let loaded = store.load(&name).await.unwrap().unwrap();

        assert_eq!(loaded.bytes, photo().bytes);
        assert_eq!(loaded.content_type, "image/jpeg");
        assert_eq!(loaded.file_name, "breakfast.JPG");
    }

    #[tokio::test]
    async fn test_fs_store_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FsUploadStore::open(dir.path()).await.unwrap();
        assert!(store.load("does-not-exist.png").await.unwrap().is_none());
        assert!(store.load("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_data_without_sidecar_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsUploadStore::open(dir.path()).await.unwrap();

        let name = stored_name("orphan.png");
        tokio::fs::write(dir.path().join(&name), b"bytes").await.unwrap();
        assert!(store.load(&name).await.unwrap().is_none());

        let name = store.save(photo()).await.unwrap();
        tokio::fs::remove_file(dir.path().join(&name)).await.unwrap();
        assert!(store.load(&name).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryUploadStore::new();
        let name = store.save(photo()).await.unwrap();
        assert!(store.load(&name).await.unwrap().is_some());
        assert!(store.load("other").await.unwrap().is_none());
    }
}
