//! MongoDB backend for the tournament store.

mod connection;
mod error;
mod models;
/// Store implementation over a live MongoDB connection.
pub mod store;

/// Connection settings.
pub mod config;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoTournamentStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
