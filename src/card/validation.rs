//! Form input validation
//!
//! Format sanity checks only. A number that passes Luhn and the length bound
//! is well formed, not necessarily a real card.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::card::record::CardInput;

pub const MIN_CARD_DIGITS: usize = 13;
pub const MAX_CARD_DIGITS: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    CardholderName,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl CardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardholderName => "cardholderName",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: CardField,
    pub message: &'static str,
}

/// Every field that failed, in form order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: CardField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn message_for(&self, field: CardField) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Please fix validation errors before saving")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} ({})", sep, err.message, err.field.as_str())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Luhn checksum over an all-digit string. Empty or non-digit input fails.
pub fn luhn_check(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, c) in number.chars().rev().enumerate() {
        let Some(mut n) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        sum += n;
    }

    sum % 10 == 0
}

pub fn is_valid_card_number(number: &str) -> bool {
    (MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&number.len()) && luhn_check(number)
}

pub fn validate_cardholder_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    let letters_only = trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace());

    if trimmed.chars().count() >= 2 && letters_only {
        Ok(())
    } else {
        Err("Name must contain only letters")
    }
}

pub fn validate_card_number(number: &str) -> Result<(), &'static str> {
    if is_valid_card_number(number) {
        Ok(())
    } else {
        Err("Invalid card number")
    }
}

/// Parses `MM/YY` into (year, month).
fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let (month, year) = expiry.split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    if !month.chars().chain(year.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some((2000 + year, month))
}

/// A card stays valid through the last day of its expiry month.
pub fn validate_expiry(expiry: &str, today: NaiveDate) -> Result<(), &'static str> {
    let (year, month) = parse_expiry(expiry).ok_or("Invalid date format (MM/YY)")?;

    if (year, month) >= (today.year(), today.month()) {
        Ok(())
    } else {
        Err("Card has expired")
    }
}

pub fn validate_cvv(cvv: &str) -> Result<(), &'static str> {
    if (3..=4).contains(&cvv.len()) && cvv.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("CVV must be 3-4 digits")
    }
}

/// Validates normalized input, collecting every failing field.
pub fn validate(input: &CardInput, today: NaiveDate) -> Result<(), ValidationError> {
    let checks = [
        (CardField::CardholderName, validate_cardholder_name(&input.cardholder_name)),
        (CardField::CardNumber, validate_card_number(&input.card_number)),
        (CardField::ExpiryDate, validate_expiry(&input.expiry_date, today)),
        (CardField::Cvv, validate_cvv(&input.cvv)),
    ];

    let errors: Vec<FieldError> = checks
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|message| FieldError { field, message }))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}
