/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Tournament data storage and retrieval backends.
pub mod store;
