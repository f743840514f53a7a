//! Request/response payloads for the REST and SSE surfaces.

pub mod bout;
pub mod bracket;
pub mod health;
pub mod mat;
pub mod pool;
pub mod roster;
pub mod sse;
pub mod validation;
