use axum::Router;

use crate::state::SharedState;

pub mod bouts;
pub mod bracket;
pub mod docs;
pub mod health;
pub mod mats;
pub mod pools;
pub mod roster;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = roster::router()
        .merge(bouts::router())
        .merge(pools::router())
        .merge(bracket::router())
        .merge(mats::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    health::router()
        .nest("/api", api_router)
        .merge(docs_router)
        .with_state(state)
}
