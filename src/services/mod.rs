//! Service layer sitting between the HTTP routes and the engine/storage.

pub mod bout_service;
pub mod bracket_service;
pub mod documentation;
pub mod enrichment;
pub mod health_service;
pub mod mat_service;
pub mod pool_service;
pub mod roster_service;
pub mod sse_events;
pub mod sse_service;
pub mod standings_service;
pub mod storage_supervisor;
