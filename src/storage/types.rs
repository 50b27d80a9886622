//! Shared storage types
//!
//! The envelope shape is the contract between every backend: whatever the
//! medium, an envelope written and read back must compare equal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::timestamp;
use crate::card::CardType;
use crate::error::VaultError;

/// Encrypted, persisted form of a card
///
/// Serializes as `{ id, encryptedData, timestamp, cardType, lastFour }`.
/// Never carries the cardholder name, full number, expiry or CVV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub encrypted_data: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub card_type: CardType,
    pub last_four: String,
}

/// Storage backends a vault can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Local,
    RemoteDocument,
    RemoteRow,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::Local, Self::RemoteDocument, Self::RemoteRow];

    /// Selector value: `local`, `remote-document` or `remote-row`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::RemoteDocument => "remote-document",
            Self::RemoteRow => "remote-row",
        }
    }

    pub fn is_remote(&self) -> bool {
        match self {
            Self::Local => false,
            Self::RemoteDocument | Self::RemoteRow => true,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote-document" => Ok(Self::RemoteDocument),
            "remote-row" => Ok(Self::RemoteRow),
            other => Err(VaultError::config(format!("Unknown storage backend: {}", other))),
        }
    }
}

/// Logical partition inside a remote backend
///
/// Not authenticated: anyone who knows the scope string can read its
/// envelopes (they stay encrypted under the session key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerScope(pub String);

impl OwnerScope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into())
    }

    pub fn generate() -> Self {
        Self(crate::card::generate_id("user"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backend-wide key for an envelope: `"{owner}_{id}"`
    pub fn scoped_key(&self, envelope_id: &str) -> String {
        format!("{}_{}", self.0, envelope_id)
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection settings for a remote backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Full connection string; when set it wins over the fields below
    #[serde(default, skip_serializing)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    /// Collection (document store) or table (row store) name
    #[serde(default, alias = "collection", alias = "table")]
    pub container: Option<String>,
}

impl RemoteConfig {
    /// True when there is enough to attempt a connection.
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty()) || !self.host.trim().is_empty()
    }
}
