use serde::{Deserialize, Serialize};

/// Generic document wrapper keyed by a string `_id`.
///
/// Every collection uses string ids (team codes as-is, uuids rendered with
/// `to_string`) so that dumps stay readable and the wrapped body keeps its
/// own serde representation untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDocument<T> {
    /// Primary key.
    #[serde(rename = "_id")]
    pub id: String,
    /// Wrapped entity, flattened into the document root.
    #[serde(flatten)]
    pub body: T,
}

impl<T> MongoDocument<T> {
    /// Wrap `body` under the rendered `id`.
    pub fn new(id: impl ToString, body: T) -> Self {
        Self {
            id: id.to_string(),
            body,
        }
    }
}
