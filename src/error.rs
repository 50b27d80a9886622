//! Vault error types
//!
//! One error enum is shared by the codec, the storage backends and the
//! facade. Constructors mirror the variants so call sites stay short:
//! `VaultError::storage(e.to_string())`.

use thiserror::Error;

use crate::card::validation::ValidationError;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Form input rejected before anything was encrypted or stored.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Wrong session key, corrupted or tampered envelope.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Remote backend is not configured or cannot be reached.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl VaultError {
    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    pub fn decryption(msg: impl Into<String>) -> Self {
        Self::Decryption(msg.into())
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short message suitable for showing to the person using the vault.
    ///
    /// Details stay in the log; this text never includes backend error
    /// strings that could leak hosts or credentials.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Encryption(_) => "Failed to encrypt card".to_string(),
            Self::Decryption(_) => {
                "Card could not be decrypted (it may belong to an earlier session)".to_string()
            }
            Self::BackendUnavailable(_) => {
                "Storage backend unavailable, using local storage".to_string()
            }
            Self::Storage(_) => "Storage operation failed".to_string(),
            Self::Config(_) => "Vault configuration is invalid".to_string(),
            Self::Timeout { .. } => "Storage backend did not respond in time".to_string(),
        }
    }

    /// True for errors that should trigger a fallback to local storage.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_) | Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("Serialization error: {}", err))
    }
}
