use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::bout::BoutView,
    engine::mat::{Mat, MatState},
};

/// Payload registering a new mat.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatRequest {
    /// Display name, e.g. `Tatami 1`.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Partial mat update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PatchMatRequest {
    /// New display name.
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    /// New state, e.g. pausing the mat between confrontations.
    #[serde(default)]
    pub etat: Option<MatState>,
}

/// Payload queuing bouts on a mat.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AssignBoutsRequest {
    /// Bouts to append to the mat's run order.
    #[validate(length(min = 1))]
    pub bout_ids: Vec<Uuid>,
}

/// Mat paired with its current bout, resolved for the read side.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatView {
    /// The mat itself.
    #[schema(inline)]
    pub mat: Mat,
    /// Bout under the pointer, enriched, when any.
    #[schema(inline)]
    pub current_bout: Option<BoutView>,
}
