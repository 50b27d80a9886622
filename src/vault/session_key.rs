//! Session key provisioning
//!
//! The key is generated on first use and lives only in this process. It is
//! never written to any backend or config file. A new session produces a new
//! key, and envelopes saved under the old one can no longer be decrypted.

use std::fmt;
use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const SESSION_KEY_LEN: usize = 32;

/// 256-bit symmetric key, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SESSION_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn expose(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Hands out the session key, creating it on the first call
#[derive(Default)]
pub struct KeyProvisioner {
    key: OnceLock<SessionKey>,
}

impl KeyProvisioner {
    pub fn new() -> Self {
        Self {
            key: OnceLock::new(),
        }
    }

    /// Uses a caller-supplied key instead of generating one.
    pub fn with_key(key: SessionKey) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(key);
        Self { key: cell }
    }

    pub fn get_or_create_key(&self) -> &SessionKey {
        self.key.get_or_init(|| {
            tracing::info!("Generated new encryption key for session");
            SessionKey::generate()
        })
    }

    pub fn has_key(&self) -> bool {
        self.key.get().is_some()
    }
}
