use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Payload creating the pool round in bulk.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePoolsRequest {
    /// Number of pools to deal the registered teams into.
    #[validate(range(min = 1, max = 10))]
    pub count: usize,
}

/// Payload sending a rencontre's bouts to a mat.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRencontreRequest {
    /// Target mat.
    pub mat_id: Uuid,
}
