//! Card-type classification by leading digit.
//!
//! A display convenience only. The tag is derived from cleartext, stored
//! unencrypted next to the envelope, and is not validated issuer data.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardType {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    #[default]
    Unknown,
}

impl CardType {
    pub fn from_number(number: &str) -> Self {
        match number.trim_start().chars().next() {
            Some('4') => Self::Visa,
            Some('5') | Some('2') => Self::Mastercard,
            Some('3') => Self::AmericanExpress,
            Some('6') => Self::Discover,
            _ => Self::Unknown,
        }
    }

    /// Label written into the envelope's `cardType` field
    pub fn label(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Visa" => Self::Visa,
            "Mastercard" => Self::Mastercard,
            "American Express" => Self::AmericanExpress,
            "Discover" => Self::Discover,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for CardType {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<CardType> for String {
    fn from(card_type: CardType) -> Self {
        card_type.label().to_string()
    }
}
