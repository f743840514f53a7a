use mongodb::error::Error as MongoError;
use thiserror::Error;

pub(super) type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI did not parse.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A required environment variable was absent.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// The client could not be built from parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// The initial ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Attempts made before giving up.
        attempts: u32,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// An upsert into a collection failed.
    #[error("failed to save document `{id}` in collection `{collection}`")]
    Save {
        /// Collection name.
        collection: &'static str,
        /// Document id.
        id: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A read from a collection failed.
    #[error("failed to load from collection `{collection}`")]
    Load {
        /// Collection name.
        collection: &'static str,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A delete from a collection failed.
    #[error("failed to delete document `{id}` from collection `{collection}`")]
    Delete {
        /// Collection name.
        collection: &'static str,
        /// Document id.
        id: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
}
