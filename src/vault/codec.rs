//! Record codec: card record ⇄ encrypted envelope
//!
//! Payload layout before base64: `[version tag: 1][nonce: 24][ciphertext + tag]`.
//! The envelope id is bound as associated data, so a payload copied under a
//! different id fails to decrypt.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::card::{CardRecord, CardType};
use crate::error::{VaultError, VaultResult};
use crate::storage::types::Envelope;
use crate::vault::cipher::{Cipher, XChaCha20Poly1305Cipher};
use crate::vault::session_key::SessionKey;

pub struct RecordCodec {
    cipher: Box<dyn Cipher>,
}

impl RecordCodec {
    pub fn new() -> Self {
        Self::with_cipher(Box::new(XChaCha20Poly1305Cipher))
    }

    pub fn with_cipher(cipher: Box<dyn Cipher>) -> Self {
        Self { cipher }
    }

    pub fn encode(&self, record: &CardRecord, key: &SessionKey) -> VaultResult<Envelope> {
        let plaintext = zeroize::Zeroizing::new(
            serde_json::to_vec(record)
                .map_err(|e| VaultError::encryption(format!("Serialization error: {}", e)))?,
        );

        let sealed = self
            .cipher
            .encrypt(key.expose(), &plaintext, record.id.as_bytes())?;

        let mut payload = Vec::with_capacity(1 + sealed.len());
        payload.push(self.cipher.version_tag());
        payload.extend_from_slice(&sealed);

        Ok(Envelope {
            id: record.id.clone(),
            encrypted_data: STANDARD.encode(&payload),
            timestamp: record.timestamp,
            card_type: CardType::from_number(&record.card_number),
            last_four: record.last_four(),
        })
    }

    pub fn decode(&self, envelope: &Envelope, key: &SessionKey) -> VaultResult<CardRecord> {
        let payload = STANDARD
            .decode(envelope.encrypted_data.as_bytes())
            .map_err(|e| VaultError::decryption(format!("Malformed payload: {}", e)))?;

        let (tag, sealed) = payload
            .split_first()
            .ok_or_else(|| VaultError::decryption("Empty payload"))?;

        if *tag != self.cipher.version_tag() {
            return Err(VaultError::decryption(format!(
                "Unsupported payload version: {:#04x}",
                tag
            )));
        }

        let plaintext = zeroize::Zeroizing::new(
            self.cipher
                .decrypt(key.expose(), sealed, envelope.id.as_bytes())?,
        );

        let record: CardRecord = serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::decryption(format!("Invalid record: {}", e)))?;

        if record.id != envelope.id {
            return Err(VaultError::decryption("Envelope id does not match record"));
        }

        Ok(record)
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::timestamp;
    use crate::card::CardInput;

    fn record(id: &str, number: &str) -> CardRecord {
        CardRecord::from_input(
            &CardInput::new("John Doe", number, "12/30", "123"),
            id.to_string(),
            timestamp::parse("2024-05-01T12:30:00.125Z").expect("timestamp"),
        )
    }

    fn key(byte: u8) -> SessionKey {
        SessionKey::from_bytes([byte; 32])
    }

    #[test]
    fn round_trip() {
        let codec = RecordCodec::new();
        let original = record("card_1", "4532015112830366");

        let envelope = codec.encode(&original, &key(1)).expect("encode");
        let decoded = codec.decode(&envelope, &key(1)).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn derived_fields_are_computed_from_plaintext() {
        let codec = RecordCodec::new();
        let envelope = codec
            .encode(&record("card_2", "5425233430109903"), &key(1))
            .expect("encode");

        assert_eq!(envelope.id, "card_2");
        assert_eq!(envelope.card_type, CardType::Mastercard);
        assert_eq!(envelope.last_four, "9903");
        assert_eq!(timestamp::format(&envelope.timestamp), "2024-05-01T12:30:00.125Z");
    }

    #[test]
    fn envelope_carries_no_cleartext_secrets() {
        let codec = RecordCodec::new();
        let envelope = codec
            .encode(&record("card_3", "4532015112830366"), &key(1))
            .expect("encode");

        let json = serde_json::to_string(&envelope).expect("serialize");
        assert!(!json.contains("4532015112830366"));
        assert!(!json.contains("John Doe"));
        assert!(!json.contains("12/30"));
    }

    #[test]
    fn different_key_fails_with_decryption_error() {
        let codec = RecordCodec::new();
        let envelope = codec
            .encode(&record("card_4", "4532015112830366"), &key(1))
            .expect("encode");

        let result = codec.decode(&envelope, &key(2));
        assert!(matches!(result, Err(VaultError::Decryption(_))));
    }

    #[test]
    fn payload_moved_to_another_id_fails() {
        let codec = RecordCodec::new();
        let mut envelope = codec
            .encode(&record("card_5", "4532015112830366"), &key(1))
            .expect("encode");
        envelope.id = "card_6".to_string();

        assert!(matches!(
            codec.decode(&envelope, &key(1)),
            Err(VaultError::Decryption(_))
        ));
    }

    #[test]
    fn malformed_and_truncated_payloads_fail() {
        let codec = RecordCodec::new();
        let mut envelope = codec
            .encode(&record("card_7", "4532015112830366"), &key(1))
            .expect("encode");

        envelope.encrypted_data = "not base64!!".to_string();
        assert!(matches!(codec.decode(&envelope, &key(1)), Err(VaultError::Decryption(_))));

        envelope.encrypted_data = String::new();
        assert!(matches!(codec.decode(&envelope, &key(1)), Err(VaultError::Decryption(_))));

        envelope.encrypted_data = STANDARD.encode([XCHACHA20_TAG, 0, 1, 2]);
        assert!(matches!(codec.decode(&envelope, &key(1)), Err(VaultError::Decryption(_))));
    }

    #[test]
    fn unknown_version_tag_fails() {
        let codec = RecordCodec::new();
        let mut envelope = codec
            .encode(&record("card_8", "4532015112830366"), &key(1))
            .expect("encode");

        let mut payload = STANDARD.decode(&envelope.encrypted_data).expect("base64");
        payload[0] = 0x7f;
        envelope.encrypted_data = STANDARD.encode(&payload);

        let err = codec.decode(&envelope, &key(1)).expect_err("should fail");
        assert!(err.to_string().contains("version"));
    }

    const XCHACHA20_TAG: u8 = crate::vault::cipher::XCHACHA20_VERSION_TAG;
}
