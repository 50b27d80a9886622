//! Backend Registry
//!
//! Central table of the storage backends a vault may switch between,
//! keyed by [`BackendKind`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::traits::StorageBackend;
use crate::storage::types::BackendKind;

/// Registry that holds all available storage backends
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Registers a backend
    ///
    /// The backend's `kind()` is used as the key; registering the same kind
    /// twice replaces the earlier backend.
    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(backend.kind(), backend);
    }

    /// Gets a backend by kind
    pub fn get(&self, kind: BackendKind) -> Option<Arc<dyn StorageBackend>> {
        self.backends.get(&kind).cloned()
    }

    /// Lists registered kinds in selector order
    pub fn list(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|kind| self.backends.contains_key(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
