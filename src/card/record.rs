//! Plaintext card records
//!
//! A [`CardRecord`] only ever lives in memory: between form submission and
//! encryption, or between decryption and display. Secret fields are wiped
//! when the value is dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::card::format::mask_card_number;
use crate::card::timestamp;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 9;

/// Generates `<prefix>_<unix-millis>_<9 base36 chars>`.
///
/// Used for card ids (`card_…`) and generated owner scopes (`user_…`).
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_RANDOM_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Raw strings as submitted by a card form
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CardInput {
    pub fn new(
        cardholder_name: impl Into<String>,
        card_number: impl Into<String>,
        expiry_date: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            cardholder_name: cardholder_name.into(),
            card_number: card_number.into(),
            expiry_date: expiry_date.into(),
            cvv: cvv.into(),
        }
    }

    /// Trims the name and expiry, and strips whitespace from number and CVV.
    pub fn normalized(&self) -> Self {
        Self {
            cardholder_name: self.cardholder_name.trim().to_string(),
            card_number: self.card_number.chars().filter(|c| !c.is_whitespace()).collect(),
            expiry_date: self.expiry_date.trim().to_string(),
            cvv: self.cvv.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("card_number", &mask_card_number(&self.card_number))
            .finish_non_exhaustive()
    }
}

/// A decrypted card
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    #[zeroize(skip)]
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl CardRecord {
    /// Builds a record from already validated, normalized input.
    pub fn from_input(input: &CardInput, id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            cardholder_name: input.cardholder_name.clone(),
            card_number: input.card_number.clone(),
            expiry_date: input.expiry_date.clone(),
            cvv: input.cvv.clone(),
            timestamp,
        }
    }

    pub fn last_four(&self) -> String {
        let chars: Vec<char> = self.card_number.chars().collect();
        chars[chars.len().saturating_sub(4)..].iter().collect()
    }

    pub fn masked_number(&self) -> String {
        mask_card_number(&self.card_number)
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("id", &self.id)
            .field("card_number", &self.masked_number())
            .field("timestamp", &timestamp::format(&self.timestamp))
            .finish_non_exhaustive()
    }
}
