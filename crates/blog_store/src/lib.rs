mod error;
mod store;

pub use crate::error::StoreError;
pub use crate::store::{SCHEMA_VERSION, SqlitePostStore};
