//! Card domain
//!
//! Plaintext card records, form input validation, card-type classification
//! and the display helpers a form layer needs. Nothing in here touches
//! storage or keys.

pub mod card_type;
pub mod format;
pub mod record;
pub mod timestamp;
pub mod validation;

pub use card_type::CardType;
pub use record::{generate_id, CardInput, CardRecord};
pub use validation::{CardField, FieldError, ValidationError};
