pub mod local;
pub mod mongodb;
pub mod postgres;

pub use local::LocalBackend;
pub use mongodb::DocumentStoreBackend;
pub use postgres::RowStoreBackend;
