// Storage Module
// Envelope persistence behind one trait, whatever the medium

pub mod drivers;
pub mod registry;
pub mod traits;
pub mod types;

pub use drivers::{DocumentStoreBackend, LocalBackend, RowStoreBackend};
pub use registry::BackendRegistry;
pub use traits::StorageBackend;
pub use types::*;
