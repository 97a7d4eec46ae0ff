mod error;
mod store;

pub use crate::error::SqliteStoreError;
pub use crate::store::SqliteDefaultsStore;
