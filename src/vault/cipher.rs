//! Authenticated record encryption
//!
//! [`Cipher`] is the seam between the codec and the AEAD primitive. The
//! version tag is stored as the first byte of every payload so a future
//! cipher can be introduced without breaking existing envelopes.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{VaultError, VaultResult};

/// Version tag for XChaCha20-Poly1305 payloads
pub const XCHACHA20_VERSION_TAG: u8 = 0x01;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

pub trait Cipher: Send + Sync {
    fn version_tag(&self) -> u8;

    /// Returns `[nonce || ciphertext || tag]`.
    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> VaultResult<Vec<u8>>;

    fn decrypt(&self, key: &[u8; 32], ciphertext: &[u8], aad: &[u8]) -> VaultResult<Vec<u8>>;
}

/// XChaCha20-Poly1305 with a random 24-byte nonce per message
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn version_tag(&self) -> u8 {
        XCHACHA20_VERSION_TAG
    }

    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> VaultResult<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: plaintext, aad })
            .map_err(|e| VaultError::encryption(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn decrypt(&self, key: &[u8; 32], ciphertext: &[u8], aad: &[u8]) -> VaultResult<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::decryption("ciphertext too short"));
        }

        let (nonce_bytes, ct) = ciphertext.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce_bytes);
        let cipher = XChaCha20Poly1305::new(key.into());

        cipher
            .decrypt(nonce, Payload { msg: ct, aad })
            .map_err(|_| VaultError::decryption("authentication failed (wrong key or corrupted data)"))
    }
}
