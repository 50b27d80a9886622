//! StorageBackend trait definition
//!
//! This is the core abstraction that every envelope store implements. The
//! vault facade only ever talks to this trait, so swapping backends never
//! changes what callers see.

use async_trait::async_trait;

use crate::error::VaultResult;
use crate::storage::types::{BackendKind, Envelope};

/// Uniform contract over one storage medium
///
/// Every method may suspend on I/O. Implementations must not hold internal
/// locks across remote calls longer than the call itself, so independent
/// operations on the same backend can interleave.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Human-readable name (e.g., "LocalStorage", "MongoDB")
    fn display_name(&self) -> &'static str;

    /// Establishes (or re-validates) the connection to the medium
    ///
    /// Called by the backend switch. Fails with `BackendUnavailable` when the
    /// backend is not configured or cannot be reached.
    async fn connect(&self) -> VaultResult<()> {
        Ok(())
    }

    /// Releases any connection held by the backend
    async fn disconnect(&self) -> VaultResult<()> {
        Ok(())
    }

    /// Inserts or replaces the envelope with the same id
    async fn save(&self, envelope: &Envelope) -> VaultResult<()>;

    /// All envelopes in the active owner scope
    ///
    /// Insertion order where the medium supports it.
    async fn list(&self) -> VaultResult<Vec<Envelope>>;

    /// Removes one envelope. Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> VaultResult<()>;

    /// Removes every envelope in the active owner scope
    async fn clear_all(&self) -> VaultResult<()>;
}
