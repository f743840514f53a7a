use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "sse",
    responses((status = 200, description = "SSE stream of tournament events"))
)]
/// Subscribe to the tournament event stream.
pub async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    sse_service::broadcast_handshake(&state).await;
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/events", get(events))
}
