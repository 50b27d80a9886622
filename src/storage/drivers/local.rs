//! Local Backend
//!
//! In-process ordered key-value store of envelopes. When a path is given the
//! whole collection is mirrored to one JSON array file after every mutation,
//! the same shape browser local storage held under a single key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{VaultError, VaultResult};
use crate::storage::traits::StorageBackend;
use crate::storage::types::{BackendKind, Envelope};

pub struct LocalBackend {
    path: Option<PathBuf>,
    envelopes: RwLock<Vec<Envelope>>,
}

impl LocalBackend {
    /// Volatile store, lost when the process exits
    pub fn in_memory() -> Self {
        Self {
            path: None,
            envelopes: RwLock::new(Vec::new()),
        }
    }

    /// Opens (or starts) a file-backed store
    ///
    /// A missing file is an empty store. A file that is not a JSON envelope
    /// array is reported rather than silently replaced.
    pub async fn open(path: impl AsRef<Path>) -> VaultResult<Self> {
        let path = path.as_ref().to_path_buf();

        let envelopes = match tokio::fs::read(&path).await {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(raw) => serde_json::from_slice::<Vec<Envelope>>(&raw).map_err(|e| {
                VaultError::storage(format!(
                    "Invalid envelope file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(VaultError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        debug!(path = %path.display(), count = envelopes.len(), "Opened local envelope store");

        Ok(Self {
            path: Some(path),
            envelopes: RwLock::new(envelopes),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the collection to disk via a sibling temp file and rename.
    async fn persist(&self, envelopes: &[Envelope]) -> VaultResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| VaultError::storage(format!("Failed to create directory: {}", e)))?;
            }
        }

        let payload = serde_json::to_vec(envelopes)?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| VaultError::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| VaultError::storage(format!("Failed to replace {}: {}", path.display(), e)))?;

        Ok(())
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn display_name(&self) -> &'static str {
        "LocalStorage"
    }

    #[instrument(skip(self, envelope), fields(card_id = %envelope.id))]
    async fn save(&self, envelope: &Envelope) -> VaultResult<()> {
        let mut envelopes = self.envelopes.write().await;

        let mut next = envelopes.clone();
        match next.iter_mut().find(|e| e.id == envelope.id) {
            Some(existing) => *existing = envelope.clone(),
            None => next.push(envelope.clone()),
        }

        // memory only changes once the mirror is written
        self.persist(&next).await?;
        *envelopes = next;

        debug!(total = envelopes.len(), "Card saved to local storage");
        Ok(())
    }

    async fn list(&self) -> VaultResult<Vec<Envelope>> {
        Ok(self.envelopes.read().await.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> VaultResult<()> {
        let mut envelopes = self.envelopes.write().await;
        if !envelopes.iter().any(|e| e.id == id) {
            return Ok(());
        }

        let next: Vec<Envelope> = envelopes.iter().filter(|e| e.id != id).cloned().collect();
        self.persist(&next).await?;
        *envelopes = next;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> VaultResult<()> {
        let mut envelopes = self.envelopes.write().await;

        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(VaultError::storage(format!(
                        "Failed to remove {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        envelopes.clear();
        Ok(())
    }
}
