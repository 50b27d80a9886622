//! Vault configuration.
//!
//! Settings are read from a per-user JSON file. Environment variables
//! override stored values so deployments can point the vault at a database
//! without editing the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::storage::types::{OwnerScope, RemoteConfig};

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// JSON file mirroring the local store; in-memory only when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub owner_scope: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub document_store: RemoteConfig,
    #[serde(default)]
    pub row_store: RemoteConfig,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn env_string_opt(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Location of the config file, `CARDVAULT_CONFIG` first.
pub fn config_path() -> PathBuf {
    if let Some(custom) = std::env::var_os("CARDVAULT_CONFIG").filter(|v| !v.is_empty()) {
        return PathBuf::from(custom);
    }

    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("CardVault");
        path.push("config.json");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".cardvault");
        path.push("config.json");
        path
    }
}

impl VaultConfig {
    /// Loads the config file (if any) and applies process environment overrides.
    pub fn load() -> VaultResult<Self> {
        let mut config = Self::load_from(&config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads one file without env overrides. A missing file yields defaults.
    pub fn load_from(path: &Path) -> VaultResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(VaultError::config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| VaultError::config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Applies `CARDVAULT_*` overrides using the given variable lookup
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> VaultResult<()> {
        if let Some(scope) = env_string_opt(&lookup, "CARDVAULT_OWNER_SCOPE") {
            self.owner_scope = Some(scope);
        }
        if let Some(path) = env_string_opt(&lookup, "CARDVAULT_LOCAL_PATH") {
            self.local.path = Some(PathBuf::from(path));
        }
        if let Some(raw) = env_string_opt(&lookup, "CARDVAULT_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = raw.parse().map_err(|_| {
                VaultError::config(format!("CARDVAULT_CONNECT_TIMEOUT_MS is not a number: {}", raw))
            })?;
        }
        if let Some(url) = env_string_opt(&lookup, "CARDVAULT_DOCUMENT_URL") {
            self.document_store.url = Some(url);
        }
        if let Some(url) = env_string_opt(&lookup, "CARDVAULT_ROW_URL") {
            self.row_store.url = Some(url);
        }
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> VaultResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| VaultError::config(format!("Failed to create config directory: {}", e)))?;
        }

        let payload = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::config(format!("Save failed: {}", e)))?;
        fs::write(path, payload).map_err(|e| VaultError::config(format!("Save failed: {}", e)))?;
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Configured owner scope, or a freshly generated one
    pub fn owner_scope(&self) -> OwnerScope {
        match self.owner_scope.as_deref().map(str::trim) {
            Some(scope) if !scope.is_empty() => OwnerScope::new(scope),
            _ => OwnerScope::generate(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            owner_scope: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            local: LocalConfig::default(),
            document_store: RemoteConfig::default(),
            row_store: RemoteConfig::default(),
        }
    }
}
