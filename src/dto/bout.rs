use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::engine::bout::{Bout, BoutState, Correction, PointKind, Side};

/// Payload marking a scoring action on one side of a bout.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkPointRequest {
    /// Side the action is booked on; for a shido, the penalized side.
    pub side: Side,
    /// Kind of score to record.
    pub kind: PointKind,
}

/// Payload opening an osaekomi hold.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartOsaekomiRequest {
    /// Holding side.
    pub side: Side,
}

/// Payload releasing an osaekomi hold with its measured duration.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StopOsaekomiRequest {
    /// Hold duration in whole seconds.
    #[validate(range(max = 600))]
    pub duration_secs: u32,
}

/// Payload applying a table-official correction to one side.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CorrectionRequest {
    /// Side the correction applies to.
    pub side: Side,
    /// Correction operation.
    #[serde(flatten)]
    pub correction: Correction,
}

/// Partial bout update driven by the table (state transitions, clock sync).
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchBoutRequest {
    /// New lifecycle state.
    #[serde(default)]
    pub etat: Option<BoutState>,
    /// Remaining seconds on the externally driven clock.
    #[serde(default)]
    pub timer: Option<i64>,
}

/// Bout projection with read-side context resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoutView {
    /// The bout itself, with corner names refreshed from the current roster.
    #[serde(flatten)]
    #[schema(inline)]
    pub bout: Bout,
    /// Mat the bout is currently assigned to, when any.
    pub mat_id: Option<Uuid>,
}

/// Outcome of releasing an osaekomi hold, as returned to the table.
#[derive(Debug, Serialize, ToSchema)]
pub struct OsaekomiResult {
    /// Updated bout.
    #[schema(inline)]
    pub bout: BoutView,
    /// Scores the hold produced, in award order.
    pub points_awarded: Vec<PointKind>,
    /// Whether the hold terminated the bout.
    pub finished: bool,
}
