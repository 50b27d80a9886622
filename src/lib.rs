// CardVault - client-side encrypted payment card vault
// Core library

pub mod card;
pub mod config;
pub mod error;
pub mod observability;
pub mod storage;
pub mod vault;

pub use card::{CardField, CardInput, CardRecord, CardType, ValidationError};
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use storage::{BackendKind, BackendRegistry, Envelope, OwnerScope, RemoteConfig, StorageBackend};
pub use vault::{CardListing, Vault, VaultStatus};
