//! Vault Module
//!
//! Session key, record encryption and the facade that callers use.

pub mod cipher;
pub mod codec;
pub mod facade;
pub mod session_key;

pub use codec::RecordCodec;
pub use facade::{BackendSelection, CardListing, DecodeFailure, Vault, VaultStatus};
pub use session_key::{KeyProvisioner, SessionKey};
